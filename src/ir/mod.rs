use std::collections::BTreeMap;
use thiserror::Error;

pub mod validate;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IrError {
    #[error("graph '{graph}': {op_type} node references undefined value '{name}'")]
    UndefinedReference {
        graph: String,
        op_type: String,
        name: String,
    },
    #[error("graph '{graph}': value '{name}' is defined more than once")]
    DuplicateName { graph: String, name: String },
    #[error("tensor '{name}': dims {dims:?} hold {expected} elements but {actual} were supplied")]
    ElementCount {
        name: String,
        dims: Vec<usize>,
        expected: usize,
        actual: usize,
    },
    #[error("tensor '{name}': {storage} storage cannot hold {data_type:?} elements")]
    StorageMismatch {
        name: String,
        data_type: DataType,
        storage: &'static str,
    },
}

/// Element types understood by the ONNX tensor schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Undefined,
    F32,
    U8,
    I8,
    U16,
    I16,
    I32,
    I64,
    String,
    Bool,
    F16,
    F64,
    U32,
    U64,
    BF16,
}

impl DataType {
    /// Size in bytes of one element in little-endian raw storage.
    pub fn byte_width(&self) -> Option<usize> {
        match self {
            DataType::U8 | DataType::I8 | DataType::Bool => Some(1),
            DataType::U16 | DataType::I16 | DataType::F16 | DataType::BF16 => Some(2),
            DataType::F32 | DataType::I32 | DataType::U32 => Some(4),
            DataType::F64 | DataType::I64 | DataType::U64 => Some(8),
            DataType::String | DataType::Undefined => None,
        }
    }
}

/// One entry of a value's shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Dim {
    Fixed(u64),
    Param(String),
    Unknown,
}

impl From<i32> for Dim {
    fn from(v: i32) -> Self {
        Dim::from(v as i64)
    }
}

impl From<i64> for Dim {
    fn from(v: i64) -> Self {
        if v < 0 {
            Dim::Unknown
        } else {
            Dim::Fixed(v as u64)
        }
    }
}

impl From<usize> for Dim {
    fn from(v: usize) -> Self {
        Dim::Fixed(v as u64)
    }
}

impl From<Option<usize>> for Dim {
    fn from(v: Option<usize>) -> Self {
        v.map_or(Dim::Unknown, Dim::from)
    }
}

impl From<&str> for Dim {
    fn from(v: &str) -> Self {
        Dim::Param(v.to_string())
    }
}

/// Declared name, element type and shape of a graph input or output.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueInfo {
    pub name: String,
    pub data_type: DataType,
    pub shape: Vec<Dim>,
}

pub fn value_info<D: Into<Dim>>(
    name: &str,
    data_type: DataType,
    shape: impl IntoIterator<Item = D>,
) -> ValueInfo {
    ValueInfo {
        name: name.to_string(),
        data_type,
        shape: shape.into_iter().map(Into::into).collect(),
    }
}

/// Payload of a constant tensor, grouped by the ONNX storage field it lands in.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    Float(Vec<f32>),
    Double(Vec<f64>),
    /// int8/16/32, uint8/16, bool and the 16-bit float types (as raw bits).
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    /// uint32 and uint64.
    Uint64(Vec<u64>),
    String(Vec<Vec<u8>>),
    Raw(Vec<u8>),
}

impl TensorData {
    fn storage(&self) -> &'static str {
        match self {
            TensorData::Float(_) => "float",
            TensorData::Double(_) => "double",
            TensorData::Int32(_) => "int32",
            TensorData::Int64(_) => "int64",
            TensorData::Uint64(_) => "uint64",
            TensorData::String(_) => "string",
            TensorData::Raw(_) => "raw",
        }
    }

    fn accepts(&self, data_type: DataType) -> bool {
        match self {
            TensorData::Float(_) => data_type == DataType::F32,
            TensorData::Double(_) => data_type == DataType::F64,
            TensorData::Int32(_) => matches!(
                data_type,
                DataType::I32
                    | DataType::I16
                    | DataType::I8
                    | DataType::U16
                    | DataType::U8
                    | DataType::Bool
                    | DataType::F16
                    | DataType::BF16
            ),
            TensorData::Int64(_) => data_type == DataType::I64,
            TensorData::Uint64(_) => matches!(data_type, DataType::U32 | DataType::U64),
            TensorData::String(_) => data_type == DataType::String,
            TensorData::Raw(_) => data_type.byte_width().is_some(),
        }
    }

    fn element_count(&self, data_type: DataType) -> usize {
        match self {
            TensorData::Float(v) => v.len(),
            TensorData::Double(v) => v.len(),
            TensorData::Int32(v) => v.len(),
            TensorData::Int64(v) => v.len(),
            TensorData::Uint64(v) => v.len(),
            TensorData::String(v) => v.len(),
            TensorData::Raw(bytes) => bytes.len() / data_type.byte_width().unwrap_or(1),
        }
    }
}

/// A named constant tensor, used as a graph initializer or a tensor attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    pub name: String,
    pub data_type: DataType,
    pub dims: Vec<usize>,
    pub data: TensorData,
}

impl Tensor {
    pub fn new(
        name: &str,
        data_type: DataType,
        dims: &[usize],
        data: TensorData,
    ) -> Result<Self, IrError> {
        if !data.accepts(data_type) {
            return Err(IrError::StorageMismatch {
                name: name.to_string(),
                data_type,
                storage: data.storage(),
            });
        }

        let expected: usize = dims.iter().product();
        let actual = data.element_count(data_type);
        let ragged_raw = match (&data, data_type.byte_width()) {
            (TensorData::Raw(bytes), Some(width)) => bytes.len() % width != 0,
            _ => false,
        };
        if expected != actual || ragged_raw {
            return Err(IrError::ElementCount {
                name: name.to_string(),
                dims: dims.to_vec(),
                expected,
                actual,
            });
        }

        Ok(Self {
            name: name.to_string(),
            data_type,
            dims: dims.to_vec(),
            data,
        })
    }

    pub fn floats(name: &str, dims: &[usize], vals: Vec<f32>) -> Result<Self, IrError> {
        Self::new(name, DataType::F32, dims, TensorData::Float(vals))
    }

    pub fn doubles(name: &str, dims: &[usize], vals: Vec<f64>) -> Result<Self, IrError> {
        Self::new(name, DataType::F64, dims, TensorData::Double(vals))
    }

    pub fn int64s(name: &str, dims: &[usize], vals: Vec<i64>) -> Result<Self, IrError> {
        Self::new(name, DataType::I64, dims, TensorData::Int64(vals))
    }

    /// Any element type whose ONNX storage is `int32_data`.
    pub fn int32s(
        name: &str,
        data_type: DataType,
        dims: &[usize],
        vals: Vec<i32>,
    ) -> Result<Self, IrError> {
        Self::new(name, data_type, dims, TensorData::Int32(vals))
    }

    pub fn uint64s(
        name: &str,
        data_type: DataType,
        dims: &[usize],
        vals: Vec<u64>,
    ) -> Result<Self, IrError> {
        Self::new(name, data_type, dims, TensorData::Uint64(vals))
    }

    pub fn bools(name: &str, dims: &[usize], vals: &[bool]) -> Result<Self, IrError> {
        let vals = vals.iter().map(|&b| b as i32).collect();
        Self::new(name, DataType::Bool, dims, TensorData::Int32(vals))
    }

    /// Half-precision values given as their IEEE 754 binary16 bit patterns.
    pub fn float16_bits(name: &str, dims: &[usize], bits: &[u16]) -> Result<Self, IrError> {
        let vals = bits.iter().map(|&b| b as i32).collect();
        Self::new(name, DataType::F16, dims, TensorData::Int32(vals))
    }

    pub fn strings(name: &str, dims: &[usize], vals: &[&str]) -> Result<Self, IrError> {
        let vals = vals.iter().map(|s| s.as_bytes().to_vec()).collect();
        Self::new(name, DataType::String, dims, TensorData::String(vals))
    }

    /// Little-endian bytes stored in `raw_data`.
    pub fn raw(
        name: &str,
        data_type: DataType,
        dims: &[usize],
        bytes: Vec<u8>,
    ) -> Result<Self, IrError> {
        Self::new(name, data_type, dims, TensorData::Raw(bytes))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Float(f32),
    Int(i64),
    String(String),
    Floats(Vec<f32>),
    Ints(Vec<i64>),
    Strings(Vec<String>),
    Tensor(Tensor),
    Graph(Graph),
}

impl From<f32> for Attribute {
    fn from(v: f32) -> Self {
        Attribute::Float(v)
    }
}

impl From<f64> for Attribute {
    fn from(v: f64) -> Self {
        Attribute::Float(v as f32)
    }
}

impl From<i64> for Attribute {
    fn from(v: i64) -> Self {
        Attribute::Int(v)
    }
}

impl From<i32> for Attribute {
    fn from(v: i32) -> Self {
        Attribute::Int(v as i64)
    }
}

impl From<&str> for Attribute {
    fn from(v: &str) -> Self {
        Attribute::String(v.to_string())
    }
}

impl From<String> for Attribute {
    fn from(v: String) -> Self {
        Attribute::String(v)
    }
}

impl From<Vec<f32>> for Attribute {
    fn from(v: Vec<f32>) -> Self {
        Attribute::Floats(v)
    }
}

impl From<Vec<i64>> for Attribute {
    fn from(v: Vec<i64>) -> Self {
        Attribute::Ints(v)
    }
}

impl From<Vec<&str>> for Attribute {
    fn from(v: Vec<&str>) -> Self {
        Attribute::Strings(v.into_iter().map(str::to_string).collect())
    }
}

impl From<Tensor> for Attribute {
    fn from(v: Tensor) -> Self {
        Attribute::Tensor(v)
    }
}

impl From<Graph> for Attribute {
    fn from(v: Graph) -> Self {
        Attribute::Graph(v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub op_type: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub attributes: BTreeMap<String, Attribute>,
}

impl Node {
    pub fn new(op_type: &str, inputs: &[&str], outputs: &[&str]) -> Self {
        Self {
            name: String::new(),
            op_type: op_type.to_string(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn attr(mut self, name: &str, value: impl Into<Attribute>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }
}

/// Shorthand for [`Node::new`].
pub fn node(op_type: &str, inputs: &[&str], outputs: &[&str]) -> Node {
    Node::new(op_type, inputs, outputs)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    pub name: String,
    pub nodes: Vec<Node>,
    pub inputs: Vec<ValueInfo>,
    pub outputs: Vec<ValueInfo>,
    pub initializers: Vec<Tensor>,
}

impl Graph {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            initializers: Vec::new(),
        }
    }
}

/// Assembles a graph without checking it; see [`Graph::validate`].
pub fn build_graph(
    name: &str,
    nodes: Vec<Node>,
    inputs: Vec<ValueInfo>,
    outputs: Vec<ValueInfo>,
    initializers: Vec<Tensor>,
) -> Graph {
    Graph {
        name: name.to_string(),
        nodes,
        inputs,
        outputs,
        initializers,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub graph: Graph,
    pub producer: String,
}

pub fn build_model(graph: Graph, producer: &str) -> Model {
    Model {
        graph,
        producer: producer.to_string(),
    }
}
