use crate::ir::{node, value_info, DataType, IrError, Tensor};
use crate::registry::FixtureOutput;

pub fn add_fp16_test() -> Result<FixtureOutput, IrError> {
    let x = value_info("0", DataType::F16, [1]);
    let y = value_info("1", DataType::F16, [1]);
    let z = value_info("2", DataType::F16, [1]);

    // '0' -> 1.5, '1' -> 2.5
    let inits = vec![
        Tensor::float16_bits("0", &[1], &[15872])?,
        Tensor::float16_bits("1", &[1], &[16640])?,
    ];

    Ok(FixtureOutput::new(vec![node("Add", &["0", "1"], &["2"])], vec![x, y], vec![z])
        .with_initializers(inits))
}

pub fn clip_test_op11() -> Result<FixtureOutput, IrError> {
    let x = value_info("0", DataType::F32, [3]);
    let y = value_info("1", DataType::F32, [3]);

    let min_val = Tensor::floats("min", &[], vec![0.0])?;
    let max_val = Tensor::floats("max", &[], vec![6.0])?;

    Ok(FixtureOutput::new(vec![node("Clip", &["0", "min", "max"], &["1"])], vec![x], vec![y])
        .with_initializers(vec![min_val, max_val]))
}

pub fn const_of_shape_int64_test() -> Result<FixtureOutput, IrError> {
    let value = Tensor::int64s("value", &[1], vec![10])?;
    let shape = Tensor::int32s("shape_tensor", DataType::I32, &[3], vec![2, 3, 4])?;
    let y = value_info("y", DataType::F32, [2, 3, 4]);

    let shape_const = node("Constant", &[], &["shape"]).attr("value", shape);
    let fill = node("ConstantOfShape", &["shape"], &["y"]).attr("value", value);

    Ok(FixtureOutput::new(vec![shape_const, fill], Vec::new(), vec![y]))
}

pub fn constant_test() -> Result<FixtureOutput, IrError> {
    let y = value_info("0", DataType::F32, [3]);
    let value = Tensor::floats("const_tensor", &[3], vec![0.0, 1.0, 2.0])?;

    Ok(FixtureOutput::new(
        vec![node("Constant", &[], &["0"]).attr("value", value)],
        Vec::new(),
        vec![y],
    ))
}

pub fn initializer_test() -> Result<FixtureOutput, IrError> {
    let x = value_info("x", DataType::F32, [1]);
    let y = value_info("y", DataType::F32, [1]);
    let k = Tensor::floats("k", &[1], vec![4.0])?;

    Ok(FixtureOutput::new(vec![node("Mul", &["x", "k"], &["y"])], vec![x], vec![y])
        .with_initializers(vec![k]))
}

pub fn pad_3arg_test() -> Result<FixtureOutput, IrError> {
    let val = Tensor::floats("val", &[], vec![1.0])?;
    let pads = Tensor::int32s("pad_size", DataType::I32, &[4], vec![1, 1, 2, 2])?;

    let arg_val = node("Constant", &[], &["arg_val"]).attr("value", val);
    let arg_pad = node("Constant", &[], &["arg_pad"]).attr("value", pads);

    let x = value_info("0", DataType::F32, [2, 2]);
    let y = value_info("1", DataType::F32, [5, 5]);

    let pad = node("Pad", &["0", "arg_pad", "arg_val"], &["1"]);

    Ok(FixtureOutput::new(vec![arg_val, arg_pad, pad], vec![x], vec![y]))
}

pub fn reshape_test() -> Result<FixtureOutput, IrError> {
    let x = value_info("0", DataType::F32, [4, 2, 3]);
    let x_shape = value_info("1", DataType::I64, [2]);
    let y = value_info("2", DataType::F32, [3, 8]);
    let y2 = value_info("3", DataType::F32, [3, 8]);

    let reshape = node("Reshape", &["0", "1"], &["2"]);
    let reshape_attr = node("Reshape", &["0"], &["3"]).attr("shape", vec![3i64, 8]);

    Ok(FixtureOutput::new(vec![reshape, reshape_attr], vec![x, x_shape], vec![y, y2])
        .with_initializers(vec![Tensor::int64s("1", &[2], vec![3, 8])?]))
}

pub fn resize_downsample_f_test() -> Result<FixtureOutput, IrError> {
    let scales = Tensor::floats("scales", &[4], vec![1.0, 1.0, 0.6, 0.6])?;
    let x = value_info("X", DataType::F32, [1, 1, 2, 4]);
    let y = value_info("Y", DataType::F32, Vec::<i64>::new());

    let resize = node("Resize", &["X", "", "scales"], &["Y"])
        .attr("coordinate_transformation_mode", "align_corners")
        .attr("mode", "nearest")
        .attr("nearest_mode", "floor");

    Ok(FixtureOutput::new(vec![resize], vec![x], vec![y]).with_initializers(vec![scales]))
}

/// Sums one constant of every storage kind after casting each to double.
pub fn sum_type_test() -> Result<FixtureOutput, IrError> {
    let raw: Vec<u8> = [1.5f64, 2.0].iter().flat_map(|v| v.to_le_bytes()).collect();
    let inits = vec![
        Tensor::bools("bool", &[2], &[true, false])?,
        Tensor::int32s("int8", DataType::I8, &[2], vec![1, 1])?,
        Tensor::int32s("uint8", DataType::U8, &[2], vec![1, 1])?,
        Tensor::int32s("uint16", DataType::U16, &[2], vec![1, 1])?,
        Tensor::uint64s("uint32", DataType::U32, &[2], vec![1, 1])?,
        Tensor::uint64s("uint64", DataType::U64, &[2], vec![1, 1])?,
        Tensor::doubles("double", &[2], vec![1.0, 1.0])?,
        Tensor::raw("raw", DataType::F64, &[2], raw)?,
    ];

    let mut nodes: Vec<_> = ["bool", "int8", "uint8", "uint16", "uint32", "uint64"]
        .iter()
        .map(|&src| {
            let out = format!("o_{src}");
            node("Cast", &[src], &[out.as_str()]).attr("to", 11)
        })
        .collect();
    nodes.push(node(
        "Sum",
        &["o_bool", "o_int8", "o_uint8", "o_uint16", "o_uint32", "o_uint64", "double", "raw"],
        &["out"],
    ));

    let y = value_info("out", DataType::F64, [2]);

    Ok(FixtureOutput::new(nodes, Vec::new(), vec![y]).with_initializers(inits))
}
