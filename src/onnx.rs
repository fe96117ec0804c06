use prost::Message;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::onnx_proto::ModelProto;
use crate::proto_adapter;
use crate::{Error, Quantization, Result, TensorDescriptor};

/// Metadata of an ONNX model: graph inputs and outputs with their
/// per-tensor quantization
#[derive(Debug, Clone)]
pub struct OnnxModel {
    inputs: Vec<TensorDescriptor>,
    outputs: Vec<TensorDescriptor>,
    model_version: i64,
    producer_name: String,
    producer_version: String,
}

impl OnnxModel {
    /// Load ONNX model from file path
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Self::load_from_bytes(&buffer)
    }

    /// Load ONNX model from byte slice
    pub fn load_from_bytes(data: &[u8]) -> Result<Self> {
        let model = ModelProto::decode(data)?;
        let graph = model
            .graph
            .ok_or_else(|| Error::InvalidModel("No graph found in model".to_string()))?;

        // initialisers by name; older exporters also list them as graph inputs
        let mut initializers = HashMap::with_capacity(graph.initializer.len());
        for tensor in &graph.initializer {
            if let Some(name) = &tensor.name
                && !name.is_empty()
            {
                initializers.insert(name.as_str(), tensor);
            }
        }

        let mut inputs = Vec::with_capacity(graph.input.len());
        for input in &graph.input {
            let name = input.name.as_deref().unwrap_or_default();
            if name.is_empty() || initializers.contains_key(name) {
                continue;
            }
            // graph inputs are fed by the caller, never produced by a node
            inputs.push(proto_adapter::descriptor_from_value_info(
                input,
                Quantization::default(),
            )?);
        }

        let mut outputs = Vec::with_capacity(graph.output.len());
        for output in &graph.output {
            let name = output.name.as_deref().unwrap_or_default();
            let quantization = proto_adapter::quantization_of(&graph, &initializers, name)?;
            outputs.push(proto_adapter::descriptor_from_value_info(
                output,
                quantization,
            )?);
        }

        Ok(OnnxModel {
            inputs,
            outputs,
            model_version: model.model_version.unwrap_or(0),
            producer_name: model.producer_name.unwrap_or_default(),
            producer_version: model.producer_version.unwrap_or_default(),
        })
    }

    /// Graph inputs, initialisers excluded
    pub fn inputs(&self) -> &[TensorDescriptor] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TensorDescriptor] {
        &self.outputs
    }

    pub fn model_version(&self) -> i64 {
        self.model_version
    }

    pub fn producer_name(&self) -> &str {
        &self.producer_name
    }

    pub fn producer_version(&self) -> &str {
        &self.producer_version
    }
}
