//! Synthetic sample data with known relationship shapes
//!
//! Generators take the RNG as a parameter so callers decide seeding; the CLI
//! seeds a `StdRng` from `--seed`. Values are drawn in a fixed order, so a
//! given seed and `rand` version always give the same data.

use crate::structs::{AssocError, Pair, Result, SampleData};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Generate linear, monotonic and non-monotonic (x, y) pairs of length `n`
///
/// # Errors
/// Returns `InputShape` if `n < 2`
pub fn generate_sample_data<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<SampleData> {
    ensure_length(n)?;

    // Linear: y1 = 0.8 x1 + noise
    let x1 = draw_normal(rng, n, 0.0, 1.0)?;
    let noise1 = draw_normal(rng, n, 0.0, 0.2)?;
    let y1 = x1.iter().zip(&noise1).map(|(x, e)| 0.8f64.mul_add(*x, *e)).collect();

    // "Monotonic": y2 = x2^2 + noise
    let x2: Vec<f64> = (0..n).map(|_| rng.gen_range(-3.0..3.0)).collect();
    let noise2 = draw_normal(rng, n, 0.0, 1.0)?;
    let y2 = x2.iter().zip(&noise2).map(|(x, e)| x.mul_add(*x, *e)).collect();

    // Non-monotonic: y3 = sin(x3) + noise on an even grid
    let x3 = linspace(-3.0, 3.0, n);
    let noise3 = draw_normal(rng, n, 0.0, 0.2)?;
    let y3 = x3.iter().zip(&noise3).map(|(x, e)| x.sin() + e).collect();

    Ok(SampleData {
        linear: Pair {
            name: "Linear".into(),
            x: x1,
            y: y1,
        },
        monotonic: Pair {
            name: "Monotonic".into(),
            x: x2,
            y: y2,
        },
        nonlinear: Pair {
            name: "Non-linear".into(),
            x: x3,
            y: y3,
        },
    })
}

/// x uniform on [-1, 1), y = x^2
///
/// # Errors
/// Returns `InputShape` if `n < 2`
pub fn generate_quadratic<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<Pair> {
    ensure_length(n)?;

    let x: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let y = x.iter().map(|v| v * v).collect();

    Ok(Pair {
        name: "Quadratic".into(),
        x,
        y,
    })
}

fn ensure_length(n: usize) -> Result<()> {
    if n < 2 {
        return Err(AssocError::InputShape(format!(
            "Sample size must be at least 2 (got {n})"
        )));
    }
    Ok(())
}

fn draw_normal<R: Rng + ?Sized>(rng: &mut R, n: usize, mean: f64, std_dev: f64) -> Result<Vec<f64>> {
    let normal = Normal::new(mean, std_dev)
        .map_err(|e| AssocError::Computation(format!("normal({mean}, {std_dev}): {e}")))?;
    Ok((0..n).map(|_| normal.sample(rng)).collect())
}

/// `n` evenly spaced points from `start` to `end` inclusive
#[allow(clippy::cast_precision_loss)]
fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { (i as f64).mul_add(step, start) })
                .collect()
        }
    }
}
