use std::path::Path;
use std::collections::BTreeMap;
use crate::exporter::onnx;
use crate::ir::{Attribute, DataType, Dim, Graph, Model, Node, Tensor, TensorData, ValueInfo};
use crate::loader::{ModelLoader, LoaderError};
use prost::Message;

use onnx::attribute_proto::AttributeType;
use onnx::tensor_shape_proto::dimension;

/// Reads ONNX protobuf files back into the graph IR.
pub struct OnnxLoader;

impl OnnxLoader {
    pub fn decode(bytes: &[u8]) -> Result<Model, LoaderError> {
        let proto = onnx::ModelProto::decode(bytes)
            .map_err(|e| LoaderError::InvalidFormat(e.to_string()))?;
        let graph = proto
            .graph
            .as_ref()
            .ok_or_else(|| LoaderError::InvalidFormat("model has no graph".to_string()))?;

        Ok(Model {
            graph: graph_from_proto(graph)?,
            producer: proto.producer_name.clone().unwrap_or_default(),
        })
    }
}

impl ModelLoader for OnnxLoader {
    fn load<P: AsRef<Path>>(path: P) -> Result<Model, LoaderError> {
        let bytes = std::fs::read(path)?;
        Self::decode(&bytes)
    }
}

fn data_type_from_code(code: i32) -> Result<DataType, LoaderError> {
    use onnx::tensor_proto::DataType as Proto;
    let proto = Proto::try_from(code).map_err(|_| LoaderError::UnsupportedDataType(code))?;
    Ok(match proto {
        Proto::Undefined => DataType::Undefined,
        Proto::Float => DataType::F32,
        Proto::Uint8 => DataType::U8,
        Proto::Int8 => DataType::I8,
        Proto::Uint16 => DataType::U16,
        Proto::Int16 => DataType::I16,
        Proto::Int32 => DataType::I32,
        Proto::Int64 => DataType::I64,
        Proto::String => DataType::String,
        Proto::Bool => DataType::Bool,
        Proto::Float16 => DataType::F16,
        Proto::Double => DataType::F64,
        Proto::Uint32 => DataType::U32,
        Proto::Uint64 => DataType::U64,
        Proto::Bfloat16 => DataType::BF16,
        Proto::Complex64 | Proto::Complex128 => return Err(LoaderError::UnsupportedDataType(code)),
    })
}

fn graph_from_proto(proto: &onnx::GraphProto) -> Result<Graph, LoaderError> {
    let mut graph = Graph::new(proto.name.as_deref().unwrap_or_default());

    for n in &proto.node {
        graph.nodes.push(node_from_proto(n)?);
    }
    for input in &proto.input {
        graph.inputs.push(value_info_from_proto(input)?);
    }
    for output in &proto.output {
        graph.outputs.push(value_info_from_proto(output)?);
    }
    for init in &proto.initializer {
        graph.initializers.push(tensor_from_proto(init)?);
    }
    Ok(graph)
}

fn node_from_proto(proto: &onnx::NodeProto) -> Result<Node, LoaderError> {
    let mut attributes = BTreeMap::new();
    for a in &proto.attribute {
        let name = a.name.clone().unwrap_or_default();
        let kind = a.r#type.unwrap_or_default();
        let value = match AttributeType::try_from(kind) {
            Ok(AttributeType::Float) => Attribute::Float(a.f.unwrap_or_default()),
            Ok(AttributeType::Int) => Attribute::Int(a.i.unwrap_or_default()),
            Ok(AttributeType::String) => {
                Attribute::String(utf8(a.s.as_deref().unwrap_or_default())?)
            }
            Ok(AttributeType::Floats) => Attribute::Floats(a.floats.clone()),
            Ok(AttributeType::Ints) => Attribute::Ints(a.ints.clone()),
            Ok(AttributeType::Strings) => Attribute::Strings(
                a.strings.iter().map(|s| utf8(s)).collect::<Result<_, _>>()?,
            ),
            Ok(AttributeType::Tensor) => match &a.t {
                Some(t) => Attribute::Tensor(tensor_from_proto(t)?),
                None => {
                    return Err(LoaderError::InvalidFormat(format!(
                        "attribute '{name}' has no tensor"
                    )))
                }
            },
            Ok(AttributeType::Graph) => match &a.g {
                Some(g) => Attribute::Graph(graph_from_proto(g)?),
                None => {
                    return Err(LoaderError::InvalidFormat(format!(
                        "attribute '{name}' has no graph"
                    )))
                }
            },
            _ => return Err(LoaderError::UnsupportedAttribute { name, kind }),
        };
        attributes.insert(name, value);
    }

    Ok(Node {
        name: proto.name.clone().unwrap_or_default(),
        op_type: proto.op_type.clone().unwrap_or_default(),
        inputs: proto.input.clone(),
        outputs: proto.output.clone(),
        attributes,
    })
}

fn value_info_from_proto(proto: &onnx::ValueInfoProto) -> Result<ValueInfo, LoaderError> {
    let name = proto.name.clone().unwrap_or_default();
    let tensor_type = match proto.r#type.as_ref().and_then(|t| t.value.as_ref()) {
        Some(onnx::type_proto::Value::TensorType(t)) => t,
        None => {
            return Err(LoaderError::InvalidFormat(format!(
                "value '{name}' is not a tensor"
            )))
        }
    };

    let shape = tensor_type
        .shape
        .as_ref()
        .map(|s| {
            s.dim
                .iter()
                .map(|d| match &d.value {
                    Some(dimension::Value::DimValue(v)) => Dim::from(*v),
                    Some(dimension::Value::DimParam(p)) => Dim::Param(p.clone()),
                    None => Dim::Unknown,
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(ValueInfo {
        name,
        data_type: data_type_from_code(tensor_type.elem_type.unwrap_or_default())?,
        shape,
    })
}

fn tensor_from_proto(proto: &onnx::TensorProto) -> Result<Tensor, LoaderError> {
    let name = proto.name.clone().unwrap_or_default();
    let data_type = data_type_from_code(proto.data_type.unwrap_or_default())?;
    let dims = proto
        .dims
        .iter()
        .map(|&d| {
            usize::try_from(d).map_err(|_| {
                LoaderError::InvalidFormat(format!("tensor '{name}' has negative dim {d}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let data = if let Some(raw) = &proto.raw_data {
        TensorData::Raw(raw.clone())
    } else {
        match data_type {
            DataType::F32 => TensorData::Float(proto.float_data.clone()),
            DataType::F64 => TensorData::Double(proto.double_data.clone()),
            DataType::I64 => TensorData::Int64(proto.int64_data.clone()),
            DataType::U32 | DataType::U64 => TensorData::Uint64(proto.uint64_data.clone()),
            DataType::String => TensorData::String(proto.string_data.clone()),
            _ => TensorData::Int32(proto.int32_data.clone()),
        }
    };

    Tensor::new(&name, data_type, &dims, data)
        .map_err(|e| LoaderError::InvalidFormat(e.to_string()))
}

fn utf8(bytes: &[u8]) -> Result<String, LoaderError> {
    String::from_utf8(bytes.to_vec()).map_err(|e| LoaderError::InvalidFormat(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::onnx_exporter::OnnxExporter;
    use crate::exporter::ModelExporter;
    use crate::ir::{build_graph, build_model, node, value_info};
    use tempfile::tempdir;

    #[test]
    fn test_load_initializer_model() {
        let graph = build_graph(
            "initializer_test",
            vec![node("Add", &["x", "k"], &["y"])],
            vec![value_info("x", DataType::F32, [1])],
            vec![value_info("y", DataType::F32, [1])],
            vec![Tensor::floats("k", &[1], vec![4.0]).unwrap()],
        );
        let model = build_model(graph, "initializer_test");

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("initializer_test.onnx");
        OnnxExporter::default().export(&model, &file_path).unwrap();

        let loaded = OnnxLoader::load(&file_path).unwrap();
        assert_eq!(loaded.graph.initializers.len(), 1);
        assert_eq!(loaded.graph.initializers[0].name, "k");
        assert_eq!(loaded.graph.initializers[0].data, TensorData::Float(vec![4.0]));
        assert_eq!(loaded, model);
    }

    #[test]
    fn test_decode_garbage() {
        let result = OnnxLoader::decode(&[0xff, 0xff, 0xff]);
        assert!(matches!(result, Err(LoaderError::InvalidFormat(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = OnnxLoader::load(dir.path().join("absent.onnx"));
        assert!(matches!(result, Err(LoaderError::Io(_))));
    }

    #[test]
    fn test_model_without_graph() {
        let proto = onnx::ModelProto::default();
        let bytes = proto.encode_to_vec();
        assert!(matches!(
            OnnxLoader::decode(&bytes),
            Err(LoaderError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_unknown_element_type() {
        assert!(matches!(
            data_type_from_code(99),
            Err(LoaderError::UnsupportedDataType(99))
        ));
    }
}
