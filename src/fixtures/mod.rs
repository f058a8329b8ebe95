//! The fixture corpus. Each builder returns the pieces of one graph and is
//! registered under its own function name.

use crate::ir::{value_info, DataType, ValueInfo};
use crate::register_fixtures;
use crate::registry::{Registry, RegistryError};

pub mod control_flow;
pub mod elementwise;
pub mod initializers;
pub mod random;
pub mod shape;

/// Builds a registry holding every fixture in the corpus.
pub fn registry() -> Result<Registry, RegistryError> {
    let mut registry = Registry::new();
    register_fixtures!(
        &mut registry,
        [
            elementwise::acos_test,
            elementwise::add_bcast_test,
            elementwise::add_scalar_test,
            elementwise::argmax_test,
            elementwise::batchnorm_1d_test,
            elementwise::cast_test,
            elementwise::lrn_test,
            elementwise::neg_test,
            elementwise::where_test,
            shape::averagepool_3d_test,
            shape::averagepool_same_upper_test,
            shape::conv_relu_maxpool_test,
            shape::gather_test,
            shape::logsoftmax_nonstd_input_test,
            shape::split_test,
            shape::variable_batch_test,
            shape::variable_batch_leq_zero_test,
            shape::dequantizelinear_axis_test,
            shape::dequantizelinear_neg_axis_test,
            initializers::add_fp16_test,
            initializers::clip_test_op11,
            initializers::const_of_shape_int64_test,
            initializers::constant_test,
            initializers::initializer_test,
            initializers::pad_3arg_test,
            initializers::reshape_test,
            initializers::resize_downsample_f_test,
            initializers::sum_type_test,
            control_flow::if_then_test,
            control_flow::if_literal_test,
            control_flow::loop_default_test,
            control_flow::loop_test,
            random::randomnormal_test,
            random::randomuniform_generated_seed_test,
            random::matmul_random_weights_test,
        ]
    )?;
    Ok(registry)
}

fn scalar(name: &str, data_type: DataType) -> ValueInfo {
    value_info(name, data_type, Vec::<i64>::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::onnx_exporter::OnnxExporter;

    #[test]
    fn test_every_fixture_builds_and_validates() {
        let registry = registry().unwrap();
        assert!(!registry.is_empty());
        for fixture in registry.iter() {
            let model = fixture.build_model().unwrap();
            assert_eq!(model.graph.name, fixture.name());
            model.graph.validate().unwrap();
            OnnxExporter::default().encode(&model).unwrap();
        }
    }

    #[test]
    fn test_names_end_with_test_suffix() {
        let registry = registry().unwrap();
        assert!(registry
            .names()
            .all(|n| n.ends_with("_test") || n.ends_with("_op11")));
    }
}
