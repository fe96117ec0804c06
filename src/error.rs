use thiserror::Error;

/// Custom error type for param-finder
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error when reading the model or writing the header
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Protobuf decoding error (ONNX)
    #[error("Protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),
    /// FlatBuffer verification error (TFLite)
    #[error("FlatBuffer verification error: {0}")]
    Flatbuffer(#[from] flatbuffers::InvalidFlatbuffer),
    /// Model structure error
    #[error("Invalid model: {0}")]
    InvalidModel(String),
    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),
    /// Unsupported feature or format
    #[error("Unsupported feature: {0}")]
    Unsupported(String),
    /// Tensor list index past the number of model inputs/outputs
    #[error("{kind} index {index} out of range, model has {count}")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        count: usize,
    },
    /// Shape dimension index past the tensor rank
    #[error("dimension {index} requested from tensor '{tensor}' of rank {rank}")]
    ShapeIndex {
        tensor: String,
        index: usize,
        rank: usize,
    },
}

impl From<std::num::TryFromIntError> for Error {
    fn from(err: std::num::TryFromIntError) -> Self {
        Error::InvalidModel(format!("Integer conversion error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
