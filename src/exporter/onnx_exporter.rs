use std::io::Write;
use std::path::Path;
use crate::ir::{Attribute, DataType, Dim, Graph, Model, Node, Tensor, TensorData, ValueInfo};
use crate::exporter::{ModelExporter, ExporterError, onnx};
use prost::Message;
use tempfile::NamedTempFile;
use tracing::debug;

use onnx::attribute_proto::AttributeType;
use onnx::tensor_shape_proto::{dimension, Dimension};

/// Writes models as ONNX protobuf files.
#[derive(Debug, Clone)]
pub struct OnnxExporter {
    pub ir_version: i64,
    /// Version of the default (`ai.onnx`) operator set.
    pub opset_version: i64,
}

impl Default for OnnxExporter {
    fn default() -> Self {
        Self {
            ir_version: onnx::Version::IrVersion202058 as i64,
            opset_version: 13,
        }
    }
}

impl OnnxExporter {
    pub fn to_proto(&self, model: &Model) -> Result<onnx::ModelProto, ExporterError> {
        model.graph.validate()?;

        let mut proto = onnx::ModelProto::default();
        proto.ir_version = Some(self.ir_version);
        proto.producer_name = Some(model.producer.clone());
        proto.opset_import.push(onnx::OperatorSetIdProto {
            domain: Some(String::new()),
            version: Some(self.opset_version),
        });
        proto.graph = Some(graph_to_proto(&model.graph)?);
        Ok(proto)
    }

    pub fn encode(&self, model: &Model) -> Result<Vec<u8>, ExporterError> {
        let proto = self.to_proto(model)?;
        let mut buf = Vec::with_capacity(proto.encoded_len());
        proto
            .encode(&mut buf)
            .map_err(|e| ExporterError::Serialization(e.to_string()))?;
        Ok(buf)
    }
}

impl ModelExporter for OnnxExporter {
    fn extension(&self) -> &'static str {
        "onnx"
    }

    fn export(&self, model: &Model, path: &Path) -> Result<(), ExporterError> {
        let buf = self.encode(model)?;

        // Stage next to the destination so the final rename stays on one filesystem.
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(&buf)?;
        file.persist(path).map_err(|e| ExporterError::Io(e.error))?;

        debug!(
            path = %path.display(),
            nodes = model.graph.nodes.len(),
            bytes = buf.len(),
            "model written"
        );
        Ok(())
    }
}

pub(crate) fn data_type_code(data_type: DataType) -> i32 {
    use onnx::tensor_proto::DataType as Proto;
    let code = match data_type {
        DataType::Undefined => Proto::Undefined,
        DataType::F32 => Proto::Float,
        DataType::U8 => Proto::Uint8,
        DataType::I8 => Proto::Int8,
        DataType::U16 => Proto::Uint16,
        DataType::I16 => Proto::Int16,
        DataType::I32 => Proto::Int32,
        DataType::I64 => Proto::Int64,
        DataType::String => Proto::String,
        DataType::Bool => Proto::Bool,
        DataType::F16 => Proto::Float16,
        DataType::F64 => Proto::Double,
        DataType::U32 => Proto::Uint32,
        DataType::U64 => Proto::Uint64,
        DataType::BF16 => Proto::Bfloat16,
    };
    code as i32
}

fn graph_to_proto(graph: &Graph) -> Result<onnx::GraphProto, ExporterError> {
    if graph.name.is_empty() {
        return Err(ExporterError::Serialization("graph name must not be empty".to_string()));
    }

    let mut proto = onnx::GraphProto::default();
    proto.name = Some(graph.name.clone());

    for node in &graph.nodes {
        proto.node.push(node_to_proto(node)?);
    }
    for input in &graph.inputs {
        proto.input.push(value_info_to_proto(input)?);
    }
    for output in &graph.outputs {
        proto.output.push(value_info_to_proto(output)?);
    }
    for init in &graph.initializers {
        proto.initializer.push(tensor_to_proto(init));
    }
    Ok(proto)
}

fn node_to_proto(node: &Node) -> Result<onnx::NodeProto, ExporterError> {
    if node.op_type.is_empty() {
        return Err(ExporterError::Serialization(format!(
            "node with outputs {:?} has no operator type",
            node.outputs
        )));
    }

    let mut n = onnx::NodeProto::default();
    if !node.name.is_empty() {
        n.name = Some(node.name.clone());
    }
    n.op_type = Some(node.op_type.clone());
    n.input = node.inputs.clone();
    n.output = node.outputs.clone();

    for (attr_name, attr_val) in &node.attributes {
        if attr_name.is_empty() {
            return Err(ExporterError::Serialization(format!(
                "{} node has an attribute without a name",
                node.op_type
            )));
        }
        let mut a = onnx::AttributeProto::default();
        a.name = Some(attr_name.clone());
        match attr_val {
            Attribute::Float(f) => {
                a.f = Some(*f);
                a.r#type = Some(AttributeType::Float as i32);
            }
            Attribute::Int(i) => {
                a.i = Some(*i);
                a.r#type = Some(AttributeType::Int as i32);
            }
            Attribute::String(s) => {
                a.s = Some(s.as_bytes().to_vec());
                a.r#type = Some(AttributeType::String as i32);
            }
            Attribute::Floats(fs) => {
                a.floats = fs.clone();
                a.r#type = Some(AttributeType::Floats as i32);
            }
            Attribute::Ints(is) => {
                a.ints = is.clone();
                a.r#type = Some(AttributeType::Ints as i32);
            }
            Attribute::Strings(ss) => {
                a.strings = ss.iter().map(|s| s.as_bytes().to_vec()).collect();
                a.r#type = Some(AttributeType::Strings as i32);
            }
            Attribute::Tensor(t) => {
                a.t = Some(tensor_to_proto(t));
                a.r#type = Some(AttributeType::Tensor as i32);
            }
            Attribute::Graph(g) => {
                a.g = Some(graph_to_proto(g)?);
                a.r#type = Some(AttributeType::Graph as i32);
            }
        }
        n.attribute.push(a);
    }
    Ok(n)
}

fn value_info_to_proto(value: &ValueInfo) -> Result<onnx::ValueInfoProto, ExporterError> {
    if value.data_type == DataType::Undefined {
        return Err(ExporterError::Serialization(format!(
            "value '{}' has an undefined element type",
            value.name
        )));
    }

    let dim = value
        .shape
        .iter()
        .map(|d| Dimension {
            denotation: None,
            value: match d {
                Dim::Fixed(v) => Some(dimension::Value::DimValue(*v as i64)),
                Dim::Param(p) => Some(dimension::Value::DimParam(p.clone())),
                Dim::Unknown => None,
            },
        })
        .collect();

    let tensor_type = onnx::type_proto::Tensor {
        elem_type: Some(data_type_code(value.data_type)),
        shape: Some(onnx::TensorShapeProto { dim }),
    };

    Ok(onnx::ValueInfoProto {
        name: Some(value.name.clone()),
        r#type: Some(onnx::TypeProto {
            denotation: None,
            value: Some(onnx::type_proto::Value::TensorType(tensor_type)),
        }),
        doc_string: None,
    })
}

fn tensor_to_proto(tensor: &Tensor) -> onnx::TensorProto {
    let mut tp = onnx::TensorProto::default();
    tp.name = Some(tensor.name.clone());
    tp.dims = tensor.dims.iter().map(|&d| d as i64).collect();
    tp.data_type = Some(data_type_code(tensor.data_type));
    match &tensor.data {
        TensorData::Float(v) => tp.float_data = v.clone(),
        TensorData::Double(v) => tp.double_data = v.clone(),
        TensorData::Int32(v) => tp.int32_data = v.clone(),
        TensorData::Int64(v) => tp.int64_data = v.clone(),
        TensorData::Uint64(v) => tp.uint64_data = v.clone(),
        TensorData::String(v) => tp.string_data = v.clone(),
        TensorData::Raw(bytes) => tp.raw_data = Some(bytes.clone()),
    }
    tp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{build_graph, build_model, node, value_info, IrError};
    use tempfile::tempdir;

    fn neg_model() -> Model {
        let graph = build_graph(
            "neg_test",
            vec![node("Neg", &["x"], &["y"])],
            vec![value_info("x", DataType::F32, [2, 3])],
            vec![value_info("y", DataType::F32, [2, 3])],
            Vec::new(),
        );
        build_model(graph, "neg_test")
    }

    #[test]
    fn test_export_neg_model() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("neg_test.onnx");

        let result = OnnxExporter::default().export(&neg_model(), &file_path);
        assert!(result.is_ok());
        assert!(file_path.exists());

        let bytes = std::fs::read(&file_path).unwrap();
        let proto = onnx::ModelProto::decode(bytes.as_slice()).unwrap();
        assert_eq!(proto.producer_name.as_deref(), Some("neg_test"));
        assert_eq!(proto.ir_version, Some(7));
        assert_eq!(proto.opset_import[0].version, Some(13));

        let graph = proto.graph.unwrap();
        assert_eq!(graph.node.len(), 1);
        assert_eq!(graph.node[0].op_type.as_deref(), Some("Neg"));
        assert_eq!(graph.node[0].name, None);
        assert!(graph.initializer.is_empty());
    }

    #[test]
    fn test_export_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("neg_test.onnx");
        std::fs::write(&file_path, b"stale").unwrap();

        OnnxExporter::default().export(&neg_model(), &file_path).unwrap();

        let bytes = std::fs::read(&file_path).unwrap();
        assert!(onnx::ModelProto::decode(bytes.as_slice()).is_ok());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_export_rejects_dangling_reference() {
        let graph = build_graph(
            "dangling",
            vec![node("Add", &["x", "w"], &["y"])],
            vec![value_info("x", DataType::F32, [1])],
            vec![value_info("y", DataType::F32, [1])],
            Vec::new(),
        );
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("dangling.onnx");

        let err = OnnxExporter::default()
            .export(&build_model(graph, "dangling"), &file_path)
            .unwrap_err();
        assert!(matches!(
            err,
            ExporterError::Invalid(IrError::UndefinedReference { ref name, .. }) if name == "w"
        ));
        assert!(!file_path.exists());
    }

    #[test]
    fn test_export_rejects_missing_op_type() {
        let graph = build_graph(
            "blank",
            vec![node("", &["x"], &["y"])],
            vec![value_info("x", DataType::F32, [1])],
            vec![value_info("y", DataType::F32, [1])],
            Vec::new(),
        );
        let err = OnnxExporter::default()
            .encode(&build_model(graph, "blank"))
            .unwrap_err();
        assert!(matches!(err, ExporterError::Serialization(_)));
    }

    #[test]
    fn test_tensor_storage_fields() {
        let f16 = Tensor::float16_bits("h", &[1], &[15872]).unwrap();
        let tp = tensor_to_proto(&f16);
        assert_eq!(tp.data_type, Some(10));
        assert_eq!(tp.int32_data, vec![15872]);

        let shape = Tensor::int64s("shape", &[2], vec![3, 8]).unwrap();
        let tp = tensor_to_proto(&shape);
        assert_eq!(tp.dims, vec![2]);
        assert_eq!(tp.int64_data, vec![3, 8]);
        assert!(tp.raw_data.is_none());
    }

    #[test]
    fn test_dynamic_dims() {
        let vi = value_info("x", DataType::F32, [-1i64, 3]);
        let proto = value_info_to_proto(&vi).unwrap();
        let Some(onnx::type_proto::Value::TensorType(t)) = proto.r#type.unwrap().value else {
            panic!("expected tensor type");
        };
        let dims = t.shape.unwrap().dim;
        assert_eq!(dims[0].value, None);
        assert_eq!(dims[1].value, Some(dimension::Value::DimValue(3)));
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let model = build_model(
            build_graph(
                "argmax",
                vec![node("ArgMax", &["x"], &["y"]).attr("keepdims", 0).attr("axis", 2)],
                vec![value_info("x", DataType::F32, [3, 4, 5, 6])],
                vec![value_info("y", DataType::F32, [3, 4, 6])],
                Vec::new(),
            ),
            "argmax",
        );
        let exporter = OnnxExporter::default();
        assert_eq!(exporter.encode(&model).unwrap(), exporter.encode(&model).unwrap());
    }
}
