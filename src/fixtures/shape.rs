use crate::ir::{node, value_info, DataType, IrError};
use crate::registry::FixtureOutput;

pub fn averagepool_3d_test() -> Result<FixtureOutput, IrError> {
    let x = value_info("0", DataType::F32, [1, 3, 5, 5, 5]);
    let out = value_info("1", DataType::F32, [1, 3, 3, 3, 3]);

    let pool = node("AveragePool", &["0"], &["1"]).attr("kernel_shape", vec![3i64, 3, 3]);

    Ok(FixtureOutput::new(vec![pool], vec![x], vec![out]))
}

pub fn averagepool_same_upper_test() -> Result<FixtureOutput, IrError> {
    let x = value_info("x", DataType::F32, [1, 1, 5, 5]);
    let y = value_info("y", DataType::F32, [1, 1, 5, 5]);

    let pool = node("AveragePool", &["x"], &["y"])
        .attr("kernel_shape", vec![2i64, 2])
        .attr("auto_pad", "SAME_UPPER");

    Ok(FixtureOutput::new(vec![pool], vec![x], vec![y]))
}

pub fn conv_relu_maxpool_test() -> Result<FixtureOutput, IrError> {
    let x = value_info("0", DataType::F32, [1, 3, 32, 32]);
    let w = value_info("1", DataType::F32, [1, 3, 5, 5]);
    let b = value_info("2", DataType::F32, [1]);
    let out = value_info("5", DataType::F32, [1, 1, 14, 14]);

    let conv = node("Conv", &["0", "1", "2"], &["3"])
        .attr("dilations", vec![1i64, 1])
        .attr("strides", vec![1i64, 1])
        .attr("pads", vec![0i64, 0, 0, 0]);
    let relu = node("Relu", &["3"], &["4"]);
    let pool = node("MaxPool", &["4"], &["5"])
        .attr("pads", vec![0i64, 0, 0, 0])
        .attr("strides", vec![2i64, 2])
        .attr("kernel_shape", vec![2i64, 2]);

    Ok(FixtureOutput::new(vec![conv, relu, pool], vec![x, w, b], vec![out]))
}

pub fn gather_test() -> Result<FixtureOutput, IrError> {
    let x = value_info("data", DataType::F32, [3, 4, 5, 6]);
    let i = value_info("indices", DataType::I32, [2, 3, 4, 5]);
    let y = value_info("y", DataType::F32, [2, 3, 4, 5]);

    let gather = node("Gather", &["data", "indices"], &["y"]).attr("axis", 1);

    Ok(FixtureOutput::new(vec![gather], vec![x, i], vec![y]))
}

pub fn logsoftmax_nonstd_input_test() -> Result<FixtureOutput, IrError> {
    let x = value_info("0", DataType::F32, [6, 9]);
    let y = value_info("2", DataType::F32, [3, 4]);

    let slice = node("Slice", &["0"], &["1"])
        .attr("axes", vec![0i64, 1])
        .attr("starts", vec![1i64, 0])
        .attr("ends", vec![4i64, 4]);
    let logsoftmax = node("LogSoftmax", &["1"], &["2"]).attr("axis", -1);

    Ok(FixtureOutput::new(vec![slice, logsoftmax], vec![x], vec![y]))
}

pub fn split_test() -> Result<FixtureOutput, IrError> {
    let x = value_info("x", DataType::F32, [10, 15]);
    let y1 = value_info("y1", DataType::F32, [10, 7]);
    let y2 = value_info("y2", DataType::F32, [10, 4]);
    let y3 = value_info("y3", DataType::F32, [10, 4]);

    let split = node("Split", &["x"], &["y1", "y2", "y3"])
        .attr("axis", 1)
        .attr("split", vec![7i64, 4, 4]);

    Ok(FixtureOutput::new(vec![split], vec![x], vec![y1, y2, y3]))
}

pub fn variable_batch_test() -> Result<FixtureOutput, IrError> {
    let x = value_info("0", DataType::F32, [None, Some(3usize), Some(16), Some(16)]);
    let y = value_info("1", DataType::F32, [None, Some(3usize), Some(16), Some(16)]);

    Ok(FixtureOutput::new(vec![node("Identity", &["0"], &["1"])], vec![x], vec![y]))
}

pub fn variable_batch_leq_zero_test() -> Result<FixtureOutput, IrError> {
    let x = value_info("0", DataType::F32, [0, 3, 16, 16]);
    let y = value_info("1", DataType::F32, [-1, 3, 16, 16]);
    let z = value_info("2", DataType::F32, [-1, 3, 16, 16]);

    Ok(FixtureOutput::new(vec![node("Add", &["0", "1"], &["2"])], vec![x, y], vec![z]))
}

/// Shared body of the DequantizeLinear per-axis fixtures.
pub fn dequantizelinear_axis_graph(axis: i64) -> Result<FixtureOutput, IrError> {
    let arg0 = value_info("0", DataType::I8, [1, 1, 5, 1]);
    let arg1 = value_info("1", DataType::F32, [5]);
    let arg2 = value_info("2", DataType::I8, [5]);
    let out = value_info("out", DataType::F32, [1, 1, 5, 1]);

    let dq = node("DequantizeLinear", &["0", "1", "2"], &["out"]).attr("axis", axis);

    Ok(FixtureOutput::new(vec![dq], vec![arg0, arg1, arg2], vec![out]))
}

pub fn dequantizelinear_axis_test() -> Result<FixtureOutput, IrError> {
    dequantizelinear_axis_graph(2)
}

pub fn dequantizelinear_neg_axis_test() -> Result<FixtureOutput, IrError> {
    dequantizelinear_axis_graph(-2)
}
