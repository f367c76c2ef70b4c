//! Pearson, Spearman and Kendall correlation with significance tests

use crate::stats::rank::{average_ranks, TieSummary};
use crate::structs::{AssocError, Association, Method, Result};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};
use std::cmp::Ordering;

/// Largest sample size for which Kendall's exact null distribution is used
const KENDALL_EXACT_MAX_N: usize = 33;

/// Check that two sequences can be correlated at all
///
/// # Errors
/// Returns `InputShape` if lengths differ, fewer than 2 values are given,
/// or any value is NaN or infinite
pub fn validate_pair(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(AssocError::InputShape(format!(
            "Vectors must have same length (got {} and {})",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 2 {
        return Err(AssocError::InputShape(
            "Need at least 2 values for correlation".into(),
        ));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(AssocError::InputShape(
            "Values must be finite (found NaN or infinity)".into(),
        ));
    }
    Ok(())
}

/// # Errors
/// Returns `Degenerate` if every value in the sequence is the same
pub fn ensure_variance(values: &[f64], label: &str) -> Result<()> {
    let first = values.first().copied().unwrap_or_default();
    if values.iter().all(|&v| v == first) {
        return Err(AssocError::Degenerate(format!(
            "{label} has zero variance"
        )));
    }
    Ok(())
}

fn validate_numeric(x: &[f64], y: &[f64]) -> Result<()> {
    validate_pair(x, y)?;
    ensure_variance(x, "x")?;
    ensure_variance(y, "y")
}

/// Pearson correlation coefficient with a two-sided t-test p-value
///
/// # Errors
/// Returns error on mismatched, short, non-finite or constant input
pub fn pearson(x: &[f64], y: &[f64]) -> Result<Association> {
    validate_numeric(x, y)?;

    let r = pearson_r(x, y);
    Ok(Association {
        method: Method::Pearson,
        coefficient: r,
        p_value: Some(t_test_p_value(r, x.len())?),
    })
}

/// Spearman rank correlation: Pearson on average ranks, same p-value test
///
/// # Errors
/// Returns error on mismatched, short, non-finite or constant input
pub fn spearman(x: &[f64], y: &[f64]) -> Result<Association> {
    validate_numeric(x, y)?;

    let r = pearson_r(&average_ranks(x), &average_ranks(y));
    Ok(Association {
        method: Method::Spearman,
        coefficient: r,
        p_value: Some(t_test_p_value(r, x.len())?),
    })
}

/// Kendall's tau-b.
///
/// The p-value uses the exact permutation distribution when neither input has
/// ties and either `n <= 33` or the pairs are nearly all concordant (or
/// discordant). Otherwise it uses the normal approximation with a
/// tie-corrected variance.
///
/// # Errors
/// Returns error on mismatched, short, non-finite or constant input
#[allow(clippy::cast_precision_loss)]
pub fn kendall(x: &[f64], y: &[f64]) -> Result<Association> {
    validate_numeric(x, y)?;

    let n = x.len();
    let mut concordant: u64 = 0;
    let mut discordant: u64 = 0;

    for i in 0..n {
        for j in (i + 1)..n {
            let dx = x[i].partial_cmp(&x[j]).unwrap_or(Ordering::Equal);
            let dy = y[i].partial_cmp(&y[j]).unwrap_or(Ordering::Equal);
            match (dx, dy) {
                (Ordering::Less, Ordering::Less) | (Ordering::Greater, Ordering::Greater) => {
                    concordant += 1;
                }
                (Ordering::Less, Ordering::Greater) | (Ordering::Greater, Ordering::Less) => {
                    discordant += 1;
                }
                _ => {}
            }
        }
    }

    let x_ties = TieSummary::of(x);
    let y_ties = TieSummary::of(y);
    let total = (n as u64) * (n as u64 - 1) / 2;
    let score = concordant as f64 - discordant as f64;

    let tau = score
        / ((total - x_ties.pairs) as f64).sqrt()
        / ((total - y_ties.pairs) as f64).sqrt();
    let tau = tau.clamp(-1.0, 1.0);

    let extreme = discordant.min(total - discordant);
    let p_value = if !x_ties.has_ties()
        && !y_ties.has_ties()
        && (n <= KENDALL_EXACT_MAX_N || extreme <= 1)
    {
        kendall_exact_p_value(n, extreme)
    } else {
        kendall_normal_p_value(n, score, &x_ties, &y_ties)?
    };

    Ok(Association {
        method: Method::Kendall,
        coefficient: tau,
        p_value: Some(p_value),
    })
}

/// Plain Pearson r over validated input, clamped to [-1, 1]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn pearson_r(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return 0.0;
    }

    (cov / denom).clamp(-1.0, 1.0)
}

/// Two-sided p-value for H0: rho = 0, from t = r * sqrt((n-2) / (1-r^2))
#[allow(clippy::cast_precision_loss)]
fn t_test_p_value(r: f64, n: usize) -> Result<f64> {
    if n < 3 {
        return Ok(1.0);
    }
    if r.abs() >= 1.0 {
        return Ok(0.0);
    }

    let df = (n - 2) as f64;
    let t = r * (df / ((1.0 - r) * (1.0 + r))).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| AssocError::Computation(format!("Student's t (df={df}): {e}")))?;

    Ok((2.0 * dist.cdf(-t.abs())).min(1.0))
}

/// Exact two-sided p-value for Kendall's tau without ties.
///
/// The number of discordant pairs under H0 follows the Mahonian distribution;
/// only the lower tail up to `extreme` is built.
#[allow(clippy::cast_precision_loss)]
fn kendall_exact_p_value(n: usize, extreme: u64) -> f64 {
    #[allow(clippy::cast_possible_truncation)]
    let c = extreme as usize;

    // probs[k] = P(D = k) for permutations of the current length
    let mut probs = vec![0.0; c + 1];
    probs[0] = 1.0;
    let mut prefix = vec![0.0; c + 1];

    for m in 2..=n {
        let mut running = 0.0;
        for (k, p) in probs.iter().enumerate() {
            running += p;
            prefix[k] = running;
        }
        for k in 0..=c {
            let outside = if k >= m { prefix[k - m] } else { 0.0 };
            probs[k] = (prefix[k] - outside) / m as f64;
        }
    }

    (2.0 * probs.iter().sum::<f64>()).min(1.0)
}

/// Normal-approximation p-value for Kendall's score S = concordant - discordant
#[allow(clippy::cast_precision_loss)]
fn kendall_normal_p_value(
    n: usize,
    score: f64,
    x_ties: &TieSummary,
    y_ties: &TieSummary,
) -> Result<f64> {
    let nf = n as f64;
    let m = nf * (nf - 1.0);

    let mut variance = (m * 2.0f64.mul_add(nf, 5.0) - x_ties.variance - y_ties.variance) / 18.0
        + (2.0 * x_ties.pairs as f64 * y_ties.pairs as f64) / m;
    if n > 2 {
        variance += x_ties.cubic * y_ties.cubic / (9.0 * m * (nf - 2.0));
    }
    if variance <= 0.0 {
        return Err(AssocError::Computation(format!(
            "Kendall score variance is not positive ({variance})"
        )));
    }

    let z = score / variance.sqrt();
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AssocError::Computation(format!("standard normal: {e}")))?;

    Ok((2.0 * normal.cdf(-z.abs())).min(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() < tol,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_pearson_perfect() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![2.0, 4.0, 6.0, 8.0, 10.0];
        let r = pearson(&x, &y).expect("pearson");

        assert_close(r.coefficient, 1.0, 1e-12);
        assert_close(r.p_value.expect("p-value"), 0.0, 1e-12);
    }

    #[test]
    fn test_pearson_quadratic() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![1.0, 4.0, 9.0, 16.0, 25.0];
        let r = pearson(&x, &y).expect("pearson");

        assert_close(r.coefficient, 0.981_104_910_251_593, 1e-9);
        assert_close(r.p_value.expect("p-value"), 0.003_109_013_108_688, 1e-9);
    }

    #[test]
    fn test_pearson_p_value_closed_form() {
        // With df = 2 the t-test p-value is 1 - |t| / sqrt(2 + t^2); r = 0.6 gives 0.4
        let r = pearson(&[1.0, 2.0, 3.0, 4.0], &[2.0, 1.0, 4.0, 3.0]).expect("pearson");

        assert_close(r.coefficient, 0.6, 1e-12);
        assert_close(r.p_value.expect("p-value"), 0.4, 1e-9);
    }

    #[test]
    fn test_two_points() {
        let r = pearson(&[1.0, 2.0], &[3.0, 1.0]).expect("pearson");
        assert_close(r.coefficient, -1.0, 1e-12);
        assert_close(r.p_value.expect("p-value"), 1.0, 1e-12);

        let tau = kendall(&[1.0, 2.0], &[3.0, 1.0]).expect("kendall");
        assert_close(tau.coefficient, -1.0, 1e-12);
        assert_close(tau.p_value.expect("p-value"), 1.0, 1e-12);
    }

    #[test]
    fn test_spearman_monotonic() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y: Vec<f64> = x.iter().map(|v: &f64| v.exp()).collect();
        let rho = spearman(&x, &y).expect("spearman");

        assert_close(rho.coefficient, 1.0, 1e-12);
    }

    #[test]
    fn test_spearman_with_ties() {
        let x = vec![1.0, 2.0, 2.0, 3.0, 4.0, 4.0, 5.0, 6.0];
        let y = vec![2.0, 1.0, 3.0, 3.0, 5.0, 4.0, 6.0, 6.0];
        let rho = spearman(&x, &y).expect("spearman");

        assert_close(rho.coefficient, 0.932_926_829_268_292_7, 1e-9);
        assert_close(rho.p_value.expect("p-value"), 0.000_716_934_059_228_5, 1e-9);
    }

    #[test]
    fn test_kendall_exact() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![1.0, 3.0, 2.0, 5.0, 4.0];
        let tau = kendall(&x, &y).expect("kendall");

        // 8 concordant, 2 discordant; P(D <= 2) = 14/120
        assert_close(tau.coefficient, 0.6, 1e-12);
        assert_close(tau.p_value.expect("p-value"), 28.0 / 120.0, 1e-12);
    }

    #[test]
    fn test_kendall_with_ties_uses_normal_approximation() {
        let x = vec![1.0, 2.0, 2.0, 3.0, 4.0, 4.0, 5.0, 6.0];
        let y = vec![2.0, 1.0, 3.0, 3.0, 5.0, 4.0, 6.0, 6.0];
        let tau = kendall(&x, &y).expect("kendall");

        assert_close(tau.coefficient, 0.846_153_846_153_846_3, 1e-9);
        assert_close(tau.p_value.expect("p-value"), 0.005_017_926_146_218_11, 1e-7);
    }

    #[test]
    fn test_kendall_large_n_perfect_uses_exact_tail() {
        let x: Vec<f64> = (0..200).map(f64::from).collect();
        let tau = kendall(&x, &x).expect("kendall");

        assert_close(tau.coefficient, 1.0, 1e-12);
        assert!(tau.p_value.expect("p-value") < 1e-300);
    }

    #[test]
    fn test_identity_gives_one() {
        let x = vec![0.3, -1.2, 2.5, 0.0, 4.1, 4.1, -0.7];
        for assoc in [
            pearson(&x, &x).expect("pearson"),
            spearman(&x, &x).expect("spearman"),
            kendall(&x, &x).expect("kendall"),
        ] {
            assert_close(assoc.coefficient, 1.0, 1e-12);
        }
    }

    #[test]
    fn test_negation_gives_minus_one() {
        let x = vec![0.3, -1.2, 2.5, 0.0, 4.1, -0.7];
        let y: Vec<f64> = x.iter().map(|v| -v).collect();

        assert_close(pearson(&x, &y).expect("pearson").coefficient, -1.0, 1e-12);
        assert_close(spearman(&x, &y).expect("spearman").coefficient, -1.0, 1e-12);
    }

    #[test]
    fn test_mismatched_lengths() {
        let err = pearson(&[1.0, 2.0, 3.0], &[1.0, 2.0]).expect_err("mismatch");
        assert!(matches!(err, AssocError::InputShape(_)));
    }

    #[test]
    fn test_too_short() {
        let err = spearman(&[1.0], &[2.0]).expect_err("too short");
        assert!(matches!(err, AssocError::InputShape(_)));
    }

    #[test]
    fn test_non_finite() {
        let err = kendall(&[1.0, f64::NAN, 3.0], &[1.0, 2.0, 3.0]).expect_err("nan");
        assert!(matches!(err, AssocError::InputShape(_)));
    }

    #[test]
    fn test_zero_variance() {
        let x = vec![1.0, 2.0, 3.0];
        let flat = vec![5.0, 5.0, 5.0];

        for err in [
            pearson(&x, &flat).expect_err("pearson"),
            spearman(&flat, &x).expect_err("spearman"),
            kendall(&x, &flat).expect_err("kendall"),
        ] {
            assert!(matches!(err, AssocError::Degenerate(_)));
        }
    }
}
