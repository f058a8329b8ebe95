//! Declarative generator for ONNX test fixtures.
//!
//! Fixture functions describe small graphs through the [`ir`] builders, a
//! [`registry::Registry`] names them, and a [`registry::runner::Runner`]
//! serializes each one with the [`exporter::onnx_exporter::OnnxExporter`].

pub mod exporter;
pub mod fixtures;
pub mod ir;
pub mod loader;
pub mod registry;
