use super::scalar;
use crate::ir::{node, value_info, DataType, IrError};
use crate::registry::FixtureOutput;

pub fn acos_test() -> Result<FixtureOutput, IrError> {
    let x = value_info("x", DataType::F32, [10]);
    let y = value_info("y", DataType::F32, [10]);

    Ok(FixtureOutput::new(vec![node("Acos", &["x"], &["y"])], vec![x], vec![y]))
}

pub fn add_bcast_test() -> Result<FixtureOutput, IrError> {
    let x = value_info("0", DataType::F32, [2, 3, 4, 5]);
    let y = value_info("1", DataType::F32, [3, 4]);
    let z = value_info("2", DataType::F32, [2, 3, 4, 5]);

    let add = node("Add", &["0", "1"], &["2"]).attr("broadcast", 1).attr("axis", 1);

    Ok(FixtureOutput::new(vec![add], vec![x, y], vec![z]))
}

pub fn add_scalar_test() -> Result<FixtureOutput, IrError> {
    let x = value_info("0", DataType::U8, [2, 3, 4, 5]);
    let y = scalar("1", DataType::U8);
    let z = value_info("2", DataType::U8, [2, 3, 4, 5]);

    Ok(FixtureOutput::new(vec![node("Add", &["0", "1"], &["2"])], vec![x, y], vec![z]))
}

pub fn argmax_test() -> Result<FixtureOutput, IrError> {
    let x = value_info("x", DataType::F32, [3, 4, 5, 6]);
    let y = value_info("y", DataType::F32, [3, 4, 6]);

    let argmax = node("ArgMax", &["x"], &["y"]).attr("axis", 2).attr("keepdims", 0);

    Ok(FixtureOutput::new(vec![argmax], vec![x], vec![y]))
}

pub fn batchnorm_1d_test() -> Result<FixtureOutput, IrError> {
    let x = value_info("0", DataType::F32, [1, 3, 5]);
    let scale = value_info("1", DataType::F32, [3]);
    let bias = value_info("2", DataType::F32, [3]);
    let mean = value_info("3", DataType::F32, [3]);
    let var = value_info("4", DataType::F32, [3]);
    let out = value_info("5", DataType::F32, [1, 3, 5]);

    let bn = node("BatchNormalization", &["0", "1", "2", "3", "4"], &["5"])
        .attr("epsilon", 1e-6f32)
        .attr("momentum", 0.9f32);

    Ok(FixtureOutput::new(vec![bn], vec![x, scale, bias, mean, var], vec![out]))
}

pub fn cast_test() -> Result<FixtureOutput, IrError> {
    let x = value_info("x", DataType::F16, [10]);
    let y = value_info("y", DataType::F32, [10]);

    let cast = node("Cast", &["x"], &["y"]).attr("to", 1);

    Ok(FixtureOutput::new(vec![cast], vec![x], vec![y]))
}

pub fn lrn_test() -> Result<FixtureOutput, IrError> {
    let x = value_info("0", DataType::F32, [1, 28, 24, 24]);
    let y = value_info("1", DataType::F32, [1, 28, 24, 24]);

    let lrn = node("LRN", &["0"], &["1"])
        .attr("size", 5)
        .attr("alpha", 0.0001f32)
        .attr("beta", 0.75f32)
        .attr("bias", 1.0f32);

    Ok(FixtureOutput::new(vec![lrn], vec![x], vec![y]))
}

pub fn neg_test() -> Result<FixtureOutput, IrError> {
    let x = value_info("x", DataType::F32, [2, 3]);
    let y = value_info("y", DataType::F32, [2, 3]);

    Ok(FixtureOutput::new(vec![node("Neg", &["x"], &["y"])], vec![x], vec![y]))
}

pub fn where_test() -> Result<FixtureOutput, IrError> {
    let c = value_info("c", DataType::Bool, [2]);
    let x = value_info("x", DataType::F32, [2, 2, 2]);
    let y = value_info("y", DataType::F32, [2, 1, 2, 2]);
    let z = value_info("z", DataType::F32, [2, 2, 2, 2]);

    Ok(FixtureOutput::new(
        vec![node("Where", &["c", "x", "y"], &["z"])],
        vec![c, x, y],
        vec![z],
    ))
}
