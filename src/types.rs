use std::fmt;

/// Tensor element data types shared by the TFLite and ONNX readers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Float32,
    Float16,
    BFloat16,
    Float64,
    Int4,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Bool,
    String,
    Complex64,
    Complex128,
    Unknown(i32),
}

impl DataType {
    /// Create DataType from a TFLite `TensorType` enum value
    pub fn from_tflite_type(tensor_type: i8) -> Self {
        match tensor_type {
            0 => DataType::Float32,
            1 => DataType::Float16,
            2 => DataType::Int32,
            3 => DataType::Uint8,
            4 => DataType::Int64,
            5 => DataType::String,
            6 => DataType::Bool,
            7 => DataType::Int16,
            8 => DataType::Complex64,
            9 => DataType::Int8,
            10 => DataType::Float64,
            11 => DataType::Complex128,
            12 => DataType::Uint64,
            15 => DataType::Uint32,
            16 => DataType::Uint16,
            17 => DataType::Int4,
            18 => DataType::BFloat16,
            other => DataType::Unknown(i32::from(other)),
        }
    }

    /// Create DataType from an ONNX `TensorProto.DataType` integer
    pub fn from_onnx_type(data_type: i32) -> Self {
        match data_type {
            1 => DataType::Float32,
            2 => DataType::Uint8,
            3 => DataType::Int8,
            4 => DataType::Uint16,
            5 => DataType::Int16,
            6 => DataType::Int32,
            7 => DataType::Int64,
            8 => DataType::String,
            9 => DataType::Bool,
            10 => DataType::Float16,
            11 => DataType::Float64,
            12 => DataType::Uint32,
            13 => DataType::Uint64,
            14 => DataType::Complex64,
            15 => DataType::Complex128,
            16 => DataType::BFloat16,
            22 => DataType::Int4,
            _ => DataType::Unknown(data_type),
        }
    }

    /// Get the size in bytes for numeric types
    ///
    /// Sub-byte types report `None`, their elements are packed.
    pub fn size_in_bytes(&self) -> Option<usize> {
        match self {
            DataType::Float32 | DataType::Int32 | DataType::Uint32 => Some(4),
            DataType::Float64 | DataType::Int64 | DataType::Uint64 => Some(8),
            DataType::Float16 | DataType::BFloat16 | DataType::Int16 | DataType::Uint16 => Some(2),
            DataType::Int8 | DataType::Uint8 | DataType::Bool => Some(1),
            DataType::Complex64 => Some(8),
            DataType::Complex128 => Some(16),
            DataType::Int4 | DataType::String | DataType::Unknown(_) => None,
        }
    }

    /// Check if this is a floating point type
    pub fn is_float(&self) -> bool {
        matches!(
            self,
            DataType::Float16 | DataType::Float32 | DataType::Float64 | DataType::BFloat16
        )
    }

    /// Check if this is an integer type
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::Int4
                | DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::Uint8
                | DataType::Uint16
                | DataType::Uint32
                | DataType::Uint64
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Unknown(code) => write!(f, "unknown({})", code),
            other => write!(f, "{}", format!("{:?}", other).to_lowercase()),
        }
    }
}
