use crate::{DataType, Error, Result};

/// Affine quantization parameters: `real = scale * (stored - zero_point)`
///
/// Tensors that are not quantized, or that are quantized per channel, carry
/// `scale == 0.0` and `zero_point == 0`, the same legacy per-tensor view the
/// TFLite interpreter reports.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Quantization {
    pub scale: f32,
    pub zero_point: i64,
}

impl Quantization {
    pub fn new(scale: f32, zero_point: i64) -> Self {
        Quantization { scale, zero_point }
    }

    /// True when the tensor carries usable per-tensor parameters
    pub fn is_quantized(&self) -> bool {
        self.scale != 0.0
    }

    /// Map a stored integer to its real value
    pub fn dequantize(&self, stored: i64) -> f32 {
        self.scale * (stored - self.zero_point) as f32
    }
}

/// Metadata of one model input or output slot
#[derive(Debug, Clone, PartialEq)]
pub struct TensorDescriptor {
    name: String,
    shape: Vec<i64>,
    data_type: DataType,
    quantization: Quantization,
}

impl TensorDescriptor {
    pub fn new(
        name: impl Into<String>,
        shape: Vec<i64>,
        data_type: DataType,
        quantization: Quantization,
    ) -> Self {
        TensorDescriptor {
            name: name.into(),
            shape,
            data_type,
            quantization,
        }
    }

    /// Tensor name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tensor shape dimensions, `-1` for unknown ones
    pub fn shape(&self) -> &[i64] {
        &self.shape
    }

    /// Tensor data type
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Output-side quantization parameters
    pub fn quantization(&self) -> Quantization {
        self.quantization
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Dimension at `index`, or [`Error::ShapeIndex`] when the rank is too small
    pub fn dim(&self, index: usize) -> Result<i64> {
        self.shape
            .get(index)
            .copied()
            .ok_or_else(|| Error::ShapeIndex {
                tensor: self.name.clone(),
                index,
                rank: self.shape.len(),
            })
    }
}

/// Pick `index` out of a descriptor list, reporting `kind` on failure
pub(crate) fn select(
    descriptors: &[TensorDescriptor],
    kind: &'static str,
    index: usize,
) -> Result<TensorDescriptor> {
    descriptors
        .get(index)
        .cloned()
        .ok_or(Error::IndexOutOfRange {
            kind,
            index,
            count: descriptors.len(),
        })
}
