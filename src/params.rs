use std::path::Path;

use tracing::{debug, info, warn};

use crate::{Error, ModelRuntime, Result, TensorDescriptor};

/// Values per detection ahead of the class scores: x, y, w, h and the
/// objectness score
pub const BOX_FIELDS: i64 = 5;

/// Parameters a YOLO post-processing pipeline is compiled against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParams {
    pub input_height: i64,
    pub input_width: i64,
    pub quantization_scale: f32,
    pub quantization_zero_point: i64,
    /// `output_shape[2] - 5`, emitted even when zero or negative
    pub num_classes: i64,
    pub num_detections: i64,
}

impl ModelParams {
    /// Derive the parameters from input 0 and output 0 of a model.
    ///
    /// The input is assumed to be laid out as (batch, height, width, channel),
    /// so height is dimension 1 and width dimension 2. This is not checked
    /// against the model; a channels-first input only gets a warning and the
    /// same indices are used.
    pub fn from_descriptors(input: &TensorDescriptor, output: &TensorDescriptor) -> Result<Self> {
        let input_height = input.dim(1)?;
        let input_width = input.dim(2)?;
        if looks_channels_first(input.shape()) {
            warn!(
                tensor = input.name(),
                shape = ?input.shape(),
                "input looks like (batch, channel, height, width), height/width are still read from dimensions 1 and 2"
            );
        }

        let num_detections = output.dim(1)?;
        let values_per_detection = output.dim(2)?;
        let num_classes = values_per_detection.checked_sub(BOX_FIELDS).ok_or_else(|| {
            Error::InvalidModel(format!(
                "output dimension {} cannot hold box fields",
                values_per_detection
            ))
        })?;

        let quantization = output.quantization();
        if !quantization.is_quantized() {
            warn!(
                tensor = output.name(),
                "output has no per-tensor quantization, scale and zero point will be 0"
            );
        }

        Ok(ModelParams {
            input_height,
            input_width,
            quantization_scale: quantization.scale,
            quantization_zero_point: quantization.zero_point,
            num_classes,
            num_detections,
        })
    }
}

fn looks_channels_first(shape: &[i64]) -> bool {
    matches!(shape, [_, c, h, w] if (*c == 1 || *c == 3) && *h > 4 && *w > 4)
}

/// Loads a model through a [`ModelRuntime`] and derives its [`ModelParams`]
#[derive(Debug, Clone)]
pub struct ParamFinder<R> {
    runtime: R,
    strict_io: bool,
}

impl<R: ModelRuntime> ParamFinder<R> {
    pub fn new(runtime: R) -> Self {
        ParamFinder {
            runtime,
            strict_io: false,
        }
    }

    /// Reject models without exactly one input and one output instead of
    /// reading index 0
    pub fn strict_io(mut self, strict_io: bool) -> Self {
        self.strict_io = strict_io;
        self
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Load `path` and extract its parameters
    pub fn find(&self, path: &Path) -> Result<ModelParams> {
        info!("loading model {}", path.display());
        let handle = self.runtime.load(path)?;

        let input_count = self.runtime.input_count(&handle);
        let output_count = self.runtime.output_count(&handle);
        debug!(inputs = input_count, outputs = output_count, "model loaded");

        if input_count != 1 || output_count != 1 {
            if self.strict_io {
                return Err(Error::InvalidModel(format!(
                    "expected 1 input and 1 output, model has {} and {}",
                    input_count, output_count
                )));
            }
            if input_count > 1 {
                warn!("model has {} inputs, only input 0 is read", input_count);
            }
            if output_count > 1 {
                warn!("model has {} outputs, only output 0 is read", output_count);
            }
        }

        let output = self.runtime.output_descriptor(&handle, 0)?;
        let input = self.runtime.input_descriptor(&handle, 0)?;
        debug!(
            input = input.name(),
            input_shape = ?input.shape(),
            output = output.name(),
            output_shape = ?output.shape(),
            "selected tensors"
        );

        let params = ModelParams::from_descriptors(&input, &output)?;
        debug!(?params, "derived parameters");
        Ok(params)
    }
}
