pub mod onnx {
    include!("onnx.rs");
}

pub mod onnx_exporter;

use crate::ir::{IrError, Model};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExporterError {
    #[error("Invalid graph: {0}")]
    Invalid(#[from] IrError),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait ModelExporter {
    /// File extension written by this exporter, without the dot.
    fn extension(&self) -> &'static str;

    fn export(&self, model: &Model, path: &std::path::Path) -> Result<(), ExporterError>;
}
