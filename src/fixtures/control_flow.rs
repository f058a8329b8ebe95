use super::random::seeded_normals;
use super::scalar;
use crate::ir::{build_graph, node, value_info, DataType, IrError, Tensor};
use crate::registry::FixtureOutput;

pub fn if_then_test() -> Result<FixtureOutput, IrError> {
    let x = value_info("x", DataType::F32, [2, 3]);
    let y = value_info("y", DataType::F32, [2, 3]);

    let then_out = value_info("then_out", DataType::F32, [2, 3]);
    let else_out = value_info("else_out", DataType::F32, [2, 3]);

    let xt = Tensor::floats("xt", &[2, 3], vec![1.0; 6])?;
    let yt = Tensor::floats("yt", &[2, 3], seeded_normals(0x1f, 6))?;

    let then_body = build_graph(
        "then_body",
        vec![node("Add", &["x", "xt"], &["then_out"])],
        Vec::new(),
        vec![then_out],
        Vec::new(),
    );
    let else_body = build_graph(
        "else_body",
        vec![node("Mul", &["y", "yt"], &["else_out"])],
        Vec::new(),
        vec![else_out],
        Vec::new(),
    );

    let cond = Tensor::bools("cond", &[1], &[true])?;
    let res = scalar("res", DataType::F32);

    let if_node = node("If", &["cond"], &["res"])
        .attr("then_branch", then_body)
        .attr("else_branch", else_body);

    Ok(FixtureOutput::new(vec![if_node], vec![x, y], vec![res])
        .with_initializers(vec![cond, xt, yt]))
}

pub fn if_literal_test() -> Result<FixtureOutput, IrError> {
    let then_out = value_info("then_out", DataType::F32, [5]);
    let else_out = value_info("else_out", DataType::F32, [5]);

    let x = Tensor::floats("x", &[5], vec![1.0, 2.0, 3.0, 4.0, 5.0])?;
    let y = Tensor::floats("y", &[5], vec![5.0, 4.0, 3.0, 2.0, 1.0])?;
    let z = Tensor::floats("z", &[0], Vec::new())?;

    let empty_const = node("Constant", &[], &["empty_out"]).attr("value", z);

    let then_body = build_graph(
        "then_body",
        vec![node("Constant", &[], &["then_out"]).attr("value", x), empty_const.clone()],
        Vec::new(),
        vec![then_out],
        Vec::new(),
    );
    let else_body = build_graph(
        "else_body",
        vec![node("Constant", &[], &["else_out"]).attr("value", y), empty_const],
        Vec::new(),
        vec![else_out],
        Vec::new(),
    );

    let cond = scalar("cond", DataType::Bool);
    let ret = scalar("ret", DataType::F32);

    let if_node = node("If", &["cond"], &["ret"])
        .attr("then_branch", then_body)
        .attr("else_branch", else_body);

    Ok(FixtureOutput::new(vec![if_node], vec![cond], vec![ret]))
}

/// Loop body shared by the Loop fixtures; `dims` is the shape of every value.
fn loop_body(dims: &[i64]) -> crate::ir::Graph {
    build_graph(
        "body",
        vec![
            node("Add", &["a", "b_in"], &["my_local"]),
            node("Sub", &["a", "b_in"], &["a_sub_b_in"]),
            node("Greater", &["my_local", "a_sub_b_in"], &["keep_going"]),
            node("Add", &["a_sub_b_in", "a_sub_b_in"], &["user_defined_vals"]),
        ],
        vec![
            value_info("iteration_num", DataType::I64, dims.to_vec()),
            value_info("keep_going_inp", DataType::Bool, dims.to_vec()),
            value_info("b_in", DataType::F32, dims.to_vec()),
        ],
        vec![
            value_info("keep_going", DataType::Bool, dims.to_vec()),
            value_info("a_sub_b_in", DataType::F32, dims.to_vec()),
            value_info("my_local", DataType::F32, dims.to_vec()),
            value_info("user_defined_vals", DataType::F32, dims.to_vec()),
        ],
        Vec::new(),
    )
}

pub fn loop_default_test() -> Result<FixtureOutput, IrError> {
    let loop_node = node(
        "Loop",
        &["", "", "b"],
        &["b_loop", "my_local_loop", "user_defined_vals_loop"],
    )
    .attr("body", loop_body(&[]));

    let a = scalar("a", DataType::F32);
    let b = scalar("b", DataType::F32);

    let b_loop = scalar("b_loop", DataType::F32);
    let uout = value_info("user_defined_vals_loop", DataType::F32, [2, 1]);

    Ok(FixtureOutput::new(vec![loop_node], vec![a, b], vec![b_loop, uout]))
}

pub fn loop_test() -> Result<FixtureOutput, IrError> {
    let loop_node = node(
        "Loop",
        &["max_trip_count", "keep_going_cond", "b"],
        &["b_loop", "my_local_loop", "user_defined_vals_loop"],
    )
    .attr("body", loop_body(&[1]));

    let iter = value_info("max_trip_count", DataType::I64, [1]);
    let cond = value_info("keep_going_cond", DataType::Bool, [1]);
    let a = value_info("a", DataType::F32, [1]);
    let b = value_info("b", DataType::F32, [1]);

    let b_loop = value_info("b_loop", DataType::F32, [1]);
    let uout = value_info("user_defined_vals_loop", DataType::F32, [2, 1]);

    Ok(FixtureOutput::new(vec![loop_node], vec![iter, cond, a, b], vec![b_loop, uout]))
}
