use std::fs;
use std::path::Path;

use tracing::debug;

use crate::tflite_schema::model_buffer_has_identifier;
use crate::{Error, OnnxModel, Result, TensorDescriptor, TfliteModel};

/// The narrow view of an inference runtime needed to read model metadata.
///
/// `load` covers both reading the artifact and whatever preparation the
/// format needs before descriptors can be queried.
pub trait ModelRuntime {
    type Handle;

    fn load(&self, path: &Path) -> Result<Self::Handle>;

    fn input_count(&self, handle: &Self::Handle) -> usize;

    fn output_count(&self, handle: &Self::Handle) -> usize;

    fn input_descriptor(&self, handle: &Self::Handle, index: usize) -> Result<TensorDescriptor>;

    fn output_descriptor(&self, handle: &Self::Handle, index: usize) -> Result<TensorDescriptor>;
}

/// Supported model serialisations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Tflite,
    Onnx,
}

impl ModelFormat {
    /// Detect the format from the file identifier, falling back to the extension
    pub fn detect(path: &Path, data: &[u8]) -> Result<Self> {
        if model_buffer_has_identifier(data) {
            return Ok(ModelFormat::Tflite);
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("tflite") => Ok(ModelFormat::Tflite),
            Some("onnx") => Ok(ModelFormat::Onnx),
            _ => Err(Error::Unsupported(format!(
                "cannot determine model format of '{}'",
                path.display()
            ))),
        }
    }
}

/// A model loaded by [`AutoRuntime`]
#[derive(Debug)]
pub enum LoadedModel {
    Tflite(TfliteModel),
    Onnx(OnnxModel),
}

impl LoadedModel {
    pub fn format(&self) -> ModelFormat {
        match self {
            LoadedModel::Tflite(_) => ModelFormat::Tflite,
            LoadedModel::Onnx(_) => ModelFormat::Onnx,
        }
    }

    pub fn inputs(&self) -> &[TensorDescriptor] {
        match self {
            LoadedModel::Tflite(m) => m.inputs(),
            LoadedModel::Onnx(m) => m.inputs(),
        }
    }

    pub fn outputs(&self) -> &[TensorDescriptor] {
        match self {
            LoadedModel::Tflite(m) => m.outputs(),
            LoadedModel::Onnx(m) => m.outputs(),
        }
    }
}

/// Runtime that picks the reader per file, or uses a forced format
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoRuntime {
    format: Option<ModelFormat>,
}

impl AutoRuntime {
    pub fn new() -> Self {
        AutoRuntime { format: None }
    }

    /// Skip detection and always read `format`
    pub fn with_format(format: ModelFormat) -> Self {
        AutoRuntime {
            format: Some(format),
        }
    }
}

impl ModelRuntime for AutoRuntime {
    type Handle = LoadedModel;

    fn load(&self, path: &Path) -> Result<LoadedModel> {
        let data = fs::read(path)?;
        let format = match self.format {
            Some(format) => format,
            None => ModelFormat::detect(path, &data)?,
        };
        debug!(path = %path.display(), ?format, bytes = data.len(), "loading model");

        match format {
            ModelFormat::Tflite => TfliteModel::load_from_bytes(&data).map(LoadedModel::Tflite),
            ModelFormat::Onnx => OnnxModel::load_from_bytes(&data).map(LoadedModel::Onnx),
        }
    }

    fn input_count(&self, handle: &LoadedModel) -> usize {
        handle.inputs().len()
    }

    fn output_count(&self, handle: &LoadedModel) -> usize {
        handle.outputs().len()
    }

    fn input_descriptor(&self, handle: &LoadedModel, index: usize) -> Result<TensorDescriptor> {
        crate::tensor::select(handle.inputs(), "input", index)
    }

    fn output_descriptor(&self, handle: &LoadedModel, index: usize) -> Result<TensorDescriptor> {
        crate::tensor::select(handle.outputs(), "output", index)
    }
}
