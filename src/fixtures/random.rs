use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ir::{node, value_info, DataType, IrError, Tensor};
use crate::registry::FixtureOutput;

/// Standard-normal samples from a fixed seed, so regenerated files stay identical.
pub(crate) fn seeded_normals(seed: u64, len: usize) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            // Box-Muller
            let u1: f32 = rng.gen_range(f32::EPSILON..1.0);
            let u2: f32 = rng.gen();
            (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos()
        })
        .collect()
}

pub fn randomnormal_test() -> Result<FixtureOutput, IrError> {
    let output = value_info("output", DataType::F64, [2, 3, 4]);

    let rn = node("RandomNormal", &[], &["output"])
        .attr("dtype", 11)
        .attr("mean", 10.0f32)
        .attr("scale", 1.5f32)
        .attr("seed", 0.0f32)
        .attr("shape", vec![2i64, 3, 4]);

    Ok(FixtureOutput::new(vec![rn], Vec::new(), vec![output]))
}

/// No `seed` attribute: the consumer picks one.
pub fn randomuniform_generated_seed_test() -> Result<FixtureOutput, IrError> {
    let input = value_info("input", DataType::F32, [1, 10]);
    let output = value_info("output", DataType::F32, [1, 10]);

    let ru = node("RandomUniformLike", &["input"], &["output"])
        .attr("low", 0.0f32)
        .attr("high", 1.0f32);

    Ok(FixtureOutput::new(vec![ru], vec![input], vec![output]))
}

pub fn matmul_random_weights_test() -> Result<FixtureOutput, IrError> {
    let x = value_info("x", DataType::F32, [2, 3]);
    let y = value_info("y", DataType::F32, [2, 4]);
    let w = Tensor::floats("w", &[3, 4], seeded_normals(0x5eed, 12))?;

    Ok(FixtureOutput::new(vec![node("MatMul", &["x", "w"], &["y"])], vec![x], vec![y])
        .with_initializers(vec![w]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_normals_repeat() {
        assert_eq!(seeded_normals(7, 16), seeded_normals(7, 16));
        assert_ne!(seeded_normals(7, 16), seeded_normals(8, 16));
        assert!(seeded_normals(7, 64).iter().all(|v| v.is_finite()));
    }
}
