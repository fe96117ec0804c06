#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use flatbuffers::FlatBufferBuilder;
use prost::Message;

use param_finder::onnx_proto::{
    GraphProto, ModelProto, NodeProto, TensorProto, TensorShapeProto, TypeProto, ValueInfoProto,
    tensor_shape_proto::{Dimension, dimension::Value},
    type_proto,
};
use param_finder::tflite_schema::{
    Model, ModelArgs, QuantizationParameters, QuantizationParametersArgs, SubGraph, SubGraphArgs,
    Tensor, TensorArgs, finish_model_buffer,
};

pub const TFLITE_UINT8: i8 = 3;
pub const TFLITE_INT8: i8 = 9;

/// Serialise a single-subgraph TFLite model with one input and one or more
/// outputs, all of which share the given output quantization
pub fn tflite_bytes(
    input_shape: &[i32],
    output_shapes: &[&[i32]],
    scale: f32,
    zero_point: i64,
) -> Vec<u8> {
    let mut fbb = FlatBufferBuilder::new();
    let mut tensors = Vec::new();

    let shape = fbb.create_vector(input_shape);
    let name = fbb.create_string("serving_default_input_1:0");
    tensors.push(Tensor::create(
        &mut fbb,
        &TensorArgs {
            shape: Some(shape),
            type_: TFLITE_UINT8,
            name: Some(name),
            ..Default::default()
        },
    ));

    for (i, &output_shape) in output_shapes.iter().enumerate() {
        let scales = fbb.create_vector(&[scale]);
        let zero_points = fbb.create_vector(&[zero_point]);
        let quantization = QuantizationParameters::create(
            &mut fbb,
            &QuantizationParametersArgs {
                scale: Some(scales),
                zero_point: Some(zero_points),
                quantized_dimension: 0,
            },
        );
        let shape = fbb.create_vector(output_shape);
        let name = fbb.create_string(&format!("StatefulPartitionedCall:{}", i));
        tensors.push(Tensor::create(
            &mut fbb,
            &TensorArgs {
                shape: Some(shape),
                type_: TFLITE_INT8,
                name: Some(name),
                quantization: Some(quantization),
                ..Default::default()
            },
        ));
    }

    let output_indices: Vec<i32> = (1..=output_shapes.len() as i32).collect();
    let tensors = fbb.create_vector(&tensors);
    let inputs = fbb.create_vector(&[0i32]);
    let outputs = fbb.create_vector(&output_indices);
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
    let model = Model::create(
        &mut fbb,
        &ModelArgs {
            subgraphs: Some(subgraphs),
            ..Default::default()
        },
    );
    finish_model_buffer(&mut fbb, model);
    fbb.finished_data().to_vec()
}

fn value_info(name: &str, dims: &[i64]) -> ValueInfoProto {
    ValueInfoProto {
        name: Some(name.to_string()),
        r#type: Some(TypeProto {
            value: Some(type_proto::Value::TensorType(type_proto::Tensor {
                elem_type: Some(1),
                shape: Some(TensorShapeProto {
                    dim: dims
                        .iter()
                        .map(|&d| Dimension {
                            value: Some(Value::DimValue(d)),
                        })
                        .collect(),
                }),
            })),
        }),
    }
}

/// Serialise a QDQ ONNX graph whose only output is produced by a
/// `DequantizeLinear` node with an int8 zero point
pub fn onnx_bytes(input_shape: &[i64], output_shape: &[i64], scale: f32, zero_point: i8) -> Vec<u8> {
    let model = ModelProto {
        ir_version: Some(8),
        producer_name: Some("onnx-quantize".to_string()),
        graph: Some(GraphProto {
            name: Some("main".to_string()),
            node: vec![NodeProto {
                input: vec![
                    "output0_quantized".to_string(),
                    "output0_scale".to_string(),
                    "output0_zero_point".to_string(),
                ],
                output: vec!["output0".to_string()],
                name: Some("output0_DequantizeLinear".to_string()),
                op_type: Some("DequantizeLinear".to_string()),
                ..Default::default()
            }],
            initializer: vec![
                TensorProto {
                    name: Some("output0_scale".to_string()),
                    data_type: Some(1),
                    raw_data: Some(scale.to_le_bytes().to_vec()),
                    ..Default::default()
                },
                TensorProto {
                    name: Some("output0_zero_point".to_string()),
                    data_type: Some(3),
                    raw_data: Some(zero_point.to_le_bytes().to_vec()),
                    ..Default::default()
                },
            ],
            input: vec![value_info("images", input_shape)],
            output: vec![value_info("output0", output_shape)],
            ..Default::default()
        }),
        ..Default::default()
    };
    model.encode_to_vec()
}

pub fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).expect("write fixture");
    path
}

pub const YOLOV5_HEADER: &str = "#ifndef MODEL_PARAMS_H
#define MODEL_PARAMS_H

#define MODEL_INPUT_HEIGHT 640
#define MODEL_INPUT_WIDTH 640

#define QUANTIZATION_SCALE 0.00392f
#define QUANTIZATION_ZERO_POINT -128

#define NUM_CLASSES 80
#define NUM_DETECTIONS 6300

#endif // MODEL_PARAMS_H
";
