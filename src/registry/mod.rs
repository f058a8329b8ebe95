use std::collections::HashMap;
use std::path::{Path, PathBuf};
use crate::exporter::{ExporterError, ModelExporter};
use crate::ir::{build_graph, build_model, IrError, Model, Node, Tensor, ValueInfo};
use thiserror::Error;

pub mod runner;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("fixture '{0}' is already registered")]
    DuplicateName(String),
    #[error("no fixture named '{0}'")]
    UnknownFixture(String),
    #[error("fixture '{name}' failed to build: {source}")]
    FixtureExecution {
        name: String,
        #[source]
        source: IrError,
    },
    #[error("fixture '{name}' failed to export: {source}")]
    Export {
        name: String,
        #[source]
        source: ExporterError,
    },
    #[error("fixture '{name}' panicked: {message}")]
    Panicked { name: String, message: String },
}

/// What a fixture builder hands back: the pieces of one graph.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureOutput {
    pub nodes: Vec<Node>,
    pub inputs: Vec<ValueInfo>,
    pub outputs: Vec<ValueInfo>,
    pub initializers: Vec<Tensor>,
}

impl FixtureOutput {
    pub fn new(nodes: Vec<Node>, inputs: Vec<ValueInfo>, outputs: Vec<ValueInfo>) -> Self {
        Self {
            nodes,
            inputs,
            outputs,
            initializers: Vec::new(),
        }
    }

    pub fn with_initializers(mut self, initializers: Vec<Tensor>) -> Self {
        self.initializers = initializers;
        self
    }
}

pub type BuildFn = fn() -> Result<FixtureOutput, IrError>;

/// A registered builder and the name its model is generated under.
#[derive(Debug, Clone, Copy)]
pub struct Fixture {
    name: &'static str,
    build: BuildFn,
}

impl Fixture {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The undecorated builder, for callers that want the raw graph pieces.
    pub fn builder(&self) -> BuildFn {
        self.build
    }

    pub fn build_model(&self) -> Result<Model, RegistryError> {
        let out = (self.build)().map_err(|source| RegistryError::FixtureExecution {
            name: self.name.to_string(),
            source,
        })?;
        let graph = build_graph(self.name, out.nodes, out.inputs, out.outputs, out.initializers);
        Ok(build_model(graph, self.name))
    }

    /// Builds the model and writes it to `<out_dir>/<name>.<ext>`.
    pub fn generate(
        &self,
        exporter: &dyn ModelExporter,
        out_dir: &Path,
    ) -> Result<PathBuf, RegistryError> {
        let model = self.build_model()?;
        let path = out_dir.join(format!("{}.{}", self.name, exporter.extension()));
        exporter
            .export(&model, &path)
            .map_err(|source| RegistryError::Export {
                name: self.name.to_string(),
                source,
            })?;
        Ok(path)
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    fixtures: Vec<Fixture>,
    index: HashMap<&'static str, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: &'static str,
        build: BuildFn,
    ) -> Result<&Fixture, RegistryError> {
        if self.index.contains_key(name) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }
        self.index.insert(name, self.fixtures.len());
        self.fixtures.push(Fixture { name, build });
        Ok(&self.fixtures[self.fixtures.len() - 1])
    }

    pub fn get(&self, name: &str) -> Option<&Fixture> {
        self.index.get(name).map(|&i| &self.fixtures[i])
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fixtures.iter().map(|f| f.name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fixture> {
        self.fixtures.iter()
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }
}

/// Registers each builder function under its own identifier.
#[macro_export]
macro_rules! register_fixtures {
    ($registry:expr, [$($build:path),* $(,)?]) => {{
        let registry: &mut $crate::registry::Registry = $registry;
        (|| -> Result<(), $crate::registry::RegistryError> {
            $(
                registry.register($crate::registry::__fixture_name(stringify!($build)), $build)?;
            )*
            Ok(())
        })()
    }};
}

#[doc(hidden)]
pub fn __fixture_name(path: &'static str) -> &'static str {
    path.rsplit("::").next().unwrap_or(path).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::onnx_exporter::OnnxExporter;
    use crate::ir::{node, value_info, DataType};
    use tempfile::tempdir;

    fn neg_test() -> Result<FixtureOutput, IrError> {
        Ok(FixtureOutput::new(
            vec![node("Neg", &["x"], &["y"])],
            vec![value_info("x", DataType::F32, [2, 3])],
            vec![value_info("y", DataType::F32, [2, 3])],
        ))
    }

    fn bad_shape_test() -> Result<FixtureOutput, IrError> {
        let k = Tensor::floats("k", &[2], vec![1.0])?;
        Ok(FixtureOutput::new(Vec::new(), Vec::new(), Vec::new()).with_initializers(vec![k]))
    }

    #[test]
    fn test_register_and_list_in_order() {
        let mut registry = Registry::new();
        registry.register("neg_test", neg_test).unwrap();
        registry.register("bad_shape_test", bad_shape_test).unwrap();

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["neg_test", "bad_shape_test"]);
        // restartable
        assert_eq!(registry.names().count(), 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = Registry::new();
        registry.register("neg_test", neg_test).unwrap();

        let err = registry.register("neg_test", bad_shape_test).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName(ref n) if n == "neg_test"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("neg_test").unwrap().builder()(), neg_test());
    }

    #[test]
    fn test_macro_uses_function_names() {
        let mut registry = Registry::new();
        register_fixtures!(&mut registry, [neg_test, self::bad_shape_test]).unwrap();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["neg_test", "bad_shape_test"]);

        assert!(register_fixtures!(&mut registry, [neg_test]).is_err());
    }

    #[test]
    fn test_build_model_names_graph_and_producer() {
        let mut registry = Registry::new();
        let model = registry.register("neg_test", neg_test).unwrap().build_model().unwrap();
        assert_eq!(model.graph.name, "neg_test");
        assert_eq!(model.producer, "neg_test");
        assert!(model.graph.initializers.is_empty());
    }

    #[test]
    fn test_generate_writes_named_file() {
        let mut registry = Registry::new();
        registry.register("neg_test", neg_test).unwrap();

        let dir = tempdir().unwrap();
        let path = registry
            .get("neg_test")
            .unwrap()
            .generate(&OnnxExporter::default(), dir.path())
            .unwrap();
        assert_eq!(path, dir.path().join("neg_test.onnx"));
        assert!(path.exists());
    }

    #[test]
    fn test_builder_error_is_fixture_execution() {
        let mut registry = Registry::new();
        registry.register("bad_shape_test", bad_shape_test).unwrap();

        let dir = tempdir().unwrap();
        let err = registry
            .get("bad_shape_test")
            .unwrap()
            .generate(&OnnxExporter::default(), dir.path())
            .unwrap_err();
        assert!(matches!(err, RegistryError::FixtureExecution { .. }));
        assert!(!dir.path().join("bad_shape_test.onnx").exists());
    }
}
