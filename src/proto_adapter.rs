use std::collections::HashMap;

use tracing::warn;

use crate::onnx_proto::{
    GraphProto, NodeProto, TensorProto, ValueInfoProto, tensor_shape_proto::dimension::Value,
    type_proto,
};
use crate::{DataType, Error, Quantization, Result, TensorDescriptor};

/// Centralised adapter functions that translate the prost ONNX messages into
/// crate-native descriptors. Keep all direct proto-field usage here so the
/// message subset in `onnx_proto` can change without touching the model code.
/// Build a descriptor from a graph input/output `ValueInfoProto`
pub(crate) fn descriptor_from_value_info(
    value_info: &ValueInfoProto,
    quantization: Quantization,
) -> Result<TensorDescriptor> {
    let name = value_info.name.clone().unwrap_or_default();

    let tensor_type = match value_info.r#type.as_ref().and_then(|t| t.value.as_ref()) {
        Some(type_proto::Value::TensorType(tensor_type)) => tensor_type,
        None => {
            return Err(Error::Unsupported(format!(
                "graph value '{}' is not a tensor",
                name
            )));
        }
    };

    // symbolic (dim_param) and missing dimensions are reported as -1
    let shape = tensor_type
        .shape
        .as_ref()
        .map(|shape| {
            shape
                .dim
                .iter()
                .map(|d| match &d.value {
                    Some(Value::DimValue(v)) => *v,
                    _ => -1,
                })
                .collect()
        })
        .unwrap_or_default();

    let elem_type = tensor_type
        .elem_type
        .ok_or_else(|| Error::MissingField("tensor elem_type".to_string()))?;
    if elem_type == 0 {
        return Err(Error::InvalidModel(
            "tensor elem_type must not be UNDEFINED (0)".to_string(),
        ));
    }

    Ok(TensorDescriptor::new(
        name,
        shape,
        DataType::from_onnx_type(elem_type),
        quantization,
    ))
}

/// Recover the per-tensor quantization of graph value `name`.
///
/// Only QDQ-style graphs carry it: the value must be produced by a
/// `QuantizeLinear` or `DequantizeLinear` node whose scale (input 1) and
/// optional zero point (input 2) are initializers. Any other producer means
/// the value is not quantized and reports (0.0, 0).
pub(crate) fn quantization_of(
    graph: &GraphProto,
    initializers: &HashMap<&str, &TensorProto>,
    name: &str,
) -> Result<Quantization> {
    let Some(node) = producer_of(graph, name) else {
        return Ok(Quantization::default());
    };

    let op_type = node.op_type.as_deref().unwrap_or_default();
    if op_type != "QuantizeLinear" && op_type != "DequantizeLinear" {
        return Ok(Quantization::default());
    }

    let scale_name = node.input.get(1).map(String::as_str).unwrap_or_default();
    let scale_tensor = initializers.get(scale_name).ok_or_else(|| {
        Error::Unsupported(format!(
            "{} scale '{}' for '{}' is not an initializer",
            op_type, scale_name, name
        ))
    })?;

    let zero_point_tensor = match node.input.get(2).map(String::as_str) {
        Some(zp_name) if !zp_name.is_empty() => Some(*initializers.get(zp_name).ok_or_else(|| {
            Error::Unsupported(format!(
                "{} zero point '{}' for '{}' is not an initializer",
                op_type, zp_name, name
            ))
        })?),
        _ => None,
    };

    let scales = float_values(scale_tensor)?;
    let zero_points = match zero_point_tensor {
        Some(t) => integer_values(t)?,
        None => vec![0],
    };

    if scales.len() != 1 || zero_points.len() != 1 {
        warn!(
            tensor = name,
            channels = scales.len(),
            "tensor is quantized per channel, reporting scale 0 and zero point 0"
        );
        return Ok(Quantization::default());
    }

    Ok(Quantization::new(scales[0], zero_points[0]))
}

fn producer_of<'g>(graph: &'g GraphProto, name: &str) -> Option<&'g NodeProto> {
    graph
        .node
        .iter()
        .find(|node| node.output.iter().any(|out| out == name))
}

/// Read a float initializer, either from `raw_data` or `float_data`
fn float_values(tensor: &TensorProto) -> Result<Vec<f32>> {
    let data_type = DataType::from_onnx_type(tensor.data_type.unwrap_or(0));
    if !data_type.is_float() {
        return Err(Error::InvalidModel(format!(
            "quantization scale '{}' has type {}",
            tensor.name.as_deref().unwrap_or_default(),
            data_type
        )));
    }

    match tensor.raw_data.as_deref() {
        Some(raw) if !raw.is_empty() => match data_type {
            DataType::Float32 => Ok(raw
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect()),
            DataType::Float64 => Ok(raw
                .chunks_exact(8)
                .map(|c| {
                    let mut bytes = [0u8; 8];
                    bytes.copy_from_slice(c);
                    f64::from_le_bytes(bytes) as f32
                })
                .collect()),
            other => Err(Error::Unsupported(format!(
                "quantization scale of type {}",
                other
            ))),
        },
        _ => match data_type {
            DataType::Float64 => Ok(tensor.double_data.iter().map(|&v| v as f32).collect()),
            DataType::Float32 => Ok(tensor.float_data.clone()),
            other => Err(Error::Unsupported(format!(
                "quantization scale of type {}",
                other
            ))),
        },
    }
}

/// Read an integer initializer, either from `raw_data` or the typed fields
fn integer_values(tensor: &TensorProto) -> Result<Vec<i64>> {
    let data_type = DataType::from_onnx_type(tensor.data_type.unwrap_or(0));
    if !data_type.is_integer() {
        return Err(Error::InvalidModel(format!(
            "quantization zero point '{}' has type {}",
            tensor.name.as_deref().unwrap_or_default(),
            data_type
        )));
    }

    if let Some(raw) = tensor.raw_data.as_deref()
        && !raw.is_empty()
    {
        let values = match data_type {
            DataType::Int8 => raw.iter().map(|&b| i64::from(b as i8)).collect(),
            DataType::Uint8 => raw.iter().map(|&b| i64::from(b)).collect(),
            DataType::Int16 => raw
                .chunks_exact(2)
                .map(|c| i64::from(i16::from_le_bytes([c[0], c[1]])))
                .collect(),
            DataType::Uint16 => raw
                .chunks_exact(2)
                .map(|c| i64::from(u16::from_le_bytes([c[0], c[1]])))
                .collect(),
            DataType::Int32 => raw
                .chunks_exact(4)
                .map(|c| i64::from(i32::from_le_bytes([c[0], c[1], c[2], c[3]])))
                .collect(),
            other => {
                return Err(Error::Unsupported(format!(
                    "quantization zero point of type {}",
                    other
                )));
            }
        };
        return Ok(values);
    }

    // 8 and 16 bit types are widened into int32_data
    match data_type {
        DataType::Int64 => Ok(tensor.int64_data.clone()),
        DataType::Uint32 | DataType::Uint64 => tensor
            .uint64_data
            .iter()
            .map(|&v| i64::try_from(v).map_err(Error::from))
            .collect(),
        _ => Ok(tensor.int32_data.iter().map(|&v| i64::from(v)).collect()),
    }
}
