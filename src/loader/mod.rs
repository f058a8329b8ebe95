use std::path::Path;
use crate::ir::Model;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Unsupported element type code: {0}")]
    UnsupportedDataType(i32),
    #[error("Unsupported attribute '{name}' of type {kind}")]
    UnsupportedAttribute { name: String, kind: i32 },
}

pub trait ModelLoader {
    fn load<P: AsRef<Path>>(path: P) -> Result<Model, LoaderError>;
}

pub mod onnx_loader;
