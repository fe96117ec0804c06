use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::tflite_schema::{self, QuantizationParameters, SubGraph};
use crate::{DataType, Error, Quantization, Result, TensorDescriptor};

/// Metadata of a TensorFlow Lite model, read from its primary subgraph
#[derive(Debug, Clone)]
pub struct TfliteModel {
    version: u32,
    description: String,
    inputs: Vec<TensorDescriptor>,
    outputs: Vec<TensorDescriptor>,
}

impl TfliteModel {
    /// Load TFLite model from file path
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let buffer = fs::read(path)?;
        Self::load_from_bytes(&buffer)
    }

    /// Load TFLite model from byte slice
    ///
    /// The buffer is verified before any table is read. Only subgraph 0 is
    /// considered, the one the interpreter invokes by default.
    pub fn load_from_bytes(data: &[u8]) -> Result<Self> {
        if !tflite_schema::model_buffer_has_identifier(data) {
            debug!("buffer has no TFL3 identifier, reading it anyway");
        }

        let model = tflite_schema::root_as_model(data)?;
        let subgraphs = model
            .subgraphs()
            .ok_or_else(|| Error::InvalidModel("No subgraphs found in model".to_string()))?;
        if subgraphs.is_empty() {
            return Err(Error::InvalidModel(
                "No subgraphs found in model".to_string(),
            ));
        }
        if subgraphs.len() > 1 {
            debug!(count = subgraphs.len(), "model has several subgraphs, using the first");
        }
        let graph = subgraphs.get(0);

        let inputs = collect_descriptors(&graph, graph.inputs(), "input")?;
        let outputs = collect_descriptors(&graph, graph.outputs(), "output")?;

        Ok(TfliteModel {
            version: model.version(),
            description: model.description().unwrap_or_default().to_string(),
            inputs,
            outputs,
        })
    }

    /// Schema version the model was written with
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Free-form description set by the converter
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn inputs(&self) -> &[TensorDescriptor] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TensorDescriptor] {
        &self.outputs
    }
}

fn collect_descriptors(
    graph: &SubGraph<'_>,
    indices: Option<flatbuffers::Vector<'_, i32>>,
    kind: &str,
) -> Result<Vec<TensorDescriptor>> {
    let indices =
        indices.ok_or_else(|| Error::MissingField(format!("subgraph {} list", kind)))?;
    let tensors = graph
        .tensors()
        .ok_or_else(|| Error::MissingField("subgraph tensors".to_string()))?;

    let mut descriptors = Vec::with_capacity(indices.len());
    for tensor_index in indices.iter() {
        let position = usize::try_from(tensor_index)?;
        if position >= tensors.len() {
            return Err(Error::InvalidModel(format!(
                "{} refers to tensor {} but subgraph has {}",
                kind,
                position,
                tensors.len()
            )));
        }
        let tensor = tensors.get(position);

        let name = tensor.name().unwrap_or_default().to_string();
        let shape: Vec<i64> = tensor
            .shape()
            .map(|s| s.iter().map(i64::from).collect())
            .unwrap_or_default();
        let quantization = tensor
            .quantization()
            .map(|q| per_tensor_quantization(&name, &q))
            .unwrap_or_default();

        descriptors.push(TensorDescriptor::new(
            name,
            shape,
            DataType::from_tflite_type(tensor.type_()),
            quantization,
        ));
    }

    Ok(descriptors)
}

/// Reduce TFLite quantization to the single (scale, zero_point) pair the
/// interpreter exposes. Anything but exactly one of each reports (0.0, 0).
fn per_tensor_quantization(name: &str, params: &QuantizationParameters<'_>) -> Quantization {
    let scale = params.scale();
    let zero_point = params.zero_point();

    match (scale, zero_point) {
        (Some(s), Some(z)) if s.len() == 1 && z.len() == 1 => Quantization::new(s.get(0), z.get(0)),
        (Some(s), _) if s.len() > 1 => {
            warn!(
                tensor = name,
                channels = s.len(),
                axis = params.quantized_dimension(),
                "tensor is quantized per channel, reporting scale 0 and zero point 0"
            );
            Quantization::default()
        }
        _ => Quantization::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tflite_schema::*;
    use flatbuffers::FlatBufferBuilder;

    struct Slot<'s> {
        name: &'s str,
        shape: &'s [i32],
        type_: i8,
        scale: &'s [f32],
        zero_point: &'s [i64],
    }

    fn build(tensors: &[Slot<'_>], inputs: &[i32], outputs: &[i32]) -> Vec<u8> {
        let mut fbb = FlatBufferBuilder::new();
        let mut offsets = Vec::new();
        for slot in tensors {
            let quantization = if slot.scale.is_empty() && slot.zero_point.is_empty() {
                None
            } else {
                let scale = fbb.create_vector(slot.scale);
                let zero_point = fbb.create_vector(slot.zero_point);
                Some(QuantizationParameters::create(
                    &mut fbb,
                    &QuantizationParametersArgs {
                        scale: Some(scale),
                        zero_point: Some(zero_point),
                        quantized_dimension: if slot.scale.len() > 1 { 3 } else { 0 },
                    },
                ))
            };
            let shape = fbb.create_vector(slot.shape);
            let name = fbb.create_string(slot.name);
            offsets.push(Tensor::create(
                &mut fbb,
                &TensorArgs {
                    shape: Some(shape),
                    type_: slot.type_,
                    name: Some(name),
                    quantization,
                    ..Default::default()
                },
            ));
        }
        let tensors = fbb.create_vector(&offsets);
        let inputs = fbb.create_vector(inputs);
        let outputs = fbb.create_vector(outputs);
        let subgraph = SubGraph::create(
            &mut fbb,
            &SubGraphArgs {
                tensors: Some(tensors),
                inputs: Some(inputs),
                outputs: Some(outputs),
                name: None,
            },
        );
        let subgraphs = fbb.create_vector(&[subgraph]);
        let description = fbb.create_string("TOCO Converted.");
        let model = Model::create(
            &mut fbb,
            &ModelArgs {
                version: 3,
                subgraphs: Some(subgraphs),
                description: Some(description),
            },
        );
        finish_model_buffer(&mut fbb, model);
        fbb.finished_data().to_vec()
    }

    fn yolo_slots() -> [Slot<'static>; 2] {
        [
            Slot {
                name: "serving_default_input_1:0",
                shape: &[1, 640, 640, 3],
                type_: 3,
                scale: &[0.003921569],
                zero_point: &[0],
            },
            Slot {
                name: "StatefulPartitionedCall:0",
                shape: &[1, 6300, 85],
                type_: 9,
                scale: &[0.00392],
                zero_point: &[-128],
            },
        ]
    }

    #[test]
    fn reads_input_and_output_descriptors() {
        let data = build(&yolo_slots(), &[0], &[1]);
        let model = TfliteModel::load_from_bytes(&data).unwrap();

        assert_eq!(model.version(), 3);
        assert_eq!(model.description(), "TOCO Converted.");
        assert_eq!(model.inputs().len(), 1);
        assert_eq!(model.outputs().len(), 1);

        let input = &model.inputs()[0];
        assert_eq!(input.name(), "serving_default_input_1:0");
        assert_eq!(input.shape(), &[1, 640, 640, 3]);
        assert_eq!(input.data_type(), DataType::Uint8);

        let output = &model.outputs()[0];
        assert_eq!(output.shape(), &[1, 6300, 85]);
        assert_eq!(output.data_type(), DataType::Int8);
        assert_eq!(output.quantization(), Quantization::new(0.00392, -128));
    }

    #[test]
    fn unquantized_and_per_channel_report_zero() {
        let slots = [
            Slot {
                name: "float_in",
                shape: &[1, 320, 320, 3],
                type_: 0,
                scale: &[],
                zero_point: &[],
            },
            Slot {
                name: "per_channel_out",
                shape: &[1, 100, 6],
                type_: 9,
                scale: &[0.1, 0.2, 0.3],
                zero_point: &[0, 0, 0],
            },
        ];
        let model = TfliteModel::load_from_bytes(&build(&slots, &[0], &[1])).unwrap();
        assert_eq!(model.inputs()[0].quantization(), Quantization::default());
        assert_eq!(model.outputs()[0].quantization(), Quantization::default());
    }

    #[test]
    fn keeps_every_io_tensor_in_order() {
        let [input, output] = yolo_slots();
        let extra = Slot {
            name: "second_output",
            shape: &[1, 10],
            type_: 0,
            scale: &[],
            zero_point: &[],
        };
        let data = build(&[input, output, extra], &[0], &[2, 1]);
        let model = TfliteModel::load_from_bytes(&data).unwrap();
        let names: Vec<&str> = model.outputs().iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["second_output", "StatefulPartitionedCall:0"]);
    }

    #[test]
    fn dangling_tensor_index_is_invalid() {
        let data = build(&yolo_slots(), &[0], &[7]);
        let err = TfliteModel::load_from_bytes(&data).unwrap_err();
        assert!(matches!(err, Error::InvalidModel(_)));

        let data = build(&yolo_slots(), &[-1], &[1]);
        let err = TfliteModel::load_from_bytes(&data).unwrap_err();
        assert!(matches!(err, Error::InvalidModel(_)));
    }

    #[test]
    fn garbage_is_rejected_by_the_verifier() {
        let err = TfliteModel::load_from_bytes(b"definitely not a flatbuffer").unwrap_err();
        assert!(matches!(err, Error::Flatbuffer(_)));
    }

    #[test]
    fn model_without_subgraphs_is_invalid() {
        let mut fbb = FlatBufferBuilder::new();
        let model = Model::create(&mut fbb, &ModelArgs::default());
        finish_model_buffer(&mut fbb, model);
        let err = TfliteModel::load_from_bytes(fbb.finished_data()).unwrap_err();
        assert!(matches!(err, Error::InvalidModel(_)));
    }
}
