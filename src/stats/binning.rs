//! Equal-frequency (quantile) binning of numeric data into categories

use crate::structs::{AssocError, Categorical, Result};

/// Bin `values` into `labels.len()` quantile bins.
///
/// Edges are linear-interpolated quantiles; bins are right-closed with the
/// lowest edge included, so the minimum lands in the first bin.
///
/// # Errors
/// Returns `InputShape` for empty or non-finite input or no labels, and
/// `Degenerate` if two bin edges coincide
#[allow(clippy::cast_precision_loss)]
pub fn quantile_bins<S: AsRef<str>>(values: &[f64], labels: &[S]) -> Result<Categorical> {
    let q = labels.len();
    if q == 0 {
        return Err(AssocError::InputShape("Need at least one bin label".into()));
    }
    if values.is_empty() {
        return Err(AssocError::InputShape("Cannot bin empty data".into()));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(AssocError::InputShape(
            "Values must be finite (found NaN or infinity)".into(),
        ));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let edges: Vec<f64> = (0..=q)
        .map(|i| percentile(&sorted, i as f64 * 100.0 / q as f64))
        .collect();

    if let Some(w) = edges.windows(2).find(|w| w[0] >= w[1]) {
        return Err(AssocError::Degenerate(format!(
            "Bin edges must be unique (edge {} repeats)",
            w[0]
        )));
    }

    let interior = &edges[1..q];
    let codes = values
        .iter()
        .map(|v| interior.iter().filter(|&&e| e < *v).count())
        .collect();

    Ok(Categorical {
        labels: labels.iter().map(|l| l.as_ref().to_string()).collect(),
        codes,
    })
}

/// Default labels `Q1..Qn` for `n` bins
#[must_use]
pub fn default_labels(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("Q{i}")).collect()
}

/// Calculate percentile using linear interpolation
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let k = (p / 100.0) * (sorted.len() - 1) as f64;
    let f = k.floor() as usize;
    let c = k.ceil() as usize;

    if f == c {
        sorted[f]
    } else {
        let d0 = sorted[f] * (c as f64 - k);
        let d1 = sorted[c] * (k - f as f64);
        d0 + d1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile() {
        let sorted = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        assert!((percentile(&sorted, 50.0) - 5.5).abs() < 1e-12);
        assert!((percentile(&sorted, 0.0) - 1.0).abs() < 1e-12);
        assert!((percentile(&sorted, 100.0) - 10.0).abs() < 1e-12);
        assert!((percentile(&sorted, 25.0) - 3.25).abs() < 1e-12);
    }

    #[test]
    fn test_quartiles() {
        let values: Vec<f64> = (1..=8).map(f64::from).collect();
        let bins = quantile_bins(&values, &["A", "B", "C", "D"]).expect("bin");

        // edges 1, 2.75, 4.5, 6.25, 8
        assert_eq!(bins.codes, vec![0, 0, 1, 1, 2, 2, 3, 3]);
        assert_eq!(bins.n_categories(), 4);
        assert_eq!(bins.label_at(0), Some("A"));
        assert_eq!(bins.label_at(7), Some("D"));
    }

    #[test]
    fn test_right_closed_edges() {
        // edges 0, 5, 10: the value on the interior edge stays in the lower bin
        let bins = quantile_bins(&[0.0, 5.0, 10.0], &["Low", "High"]).expect("bin");
        assert_eq!(bins.codes, vec![0, 0, 1]);
    }

    #[test]
    fn test_order_preserved() {
        let bins = quantile_bins(&[9.0, 1.0, 5.0], &["Low", "Medium", "High"]).expect("bin");
        assert_eq!(bins.codes, vec![2, 0, 1]);
    }

    #[test]
    fn test_duplicate_edges() {
        let err = quantile_bins(&[1.0, 1.0, 1.0, 2.0], &["a", "b"]).expect_err("duplicate edges");
        assert!(matches!(err, AssocError::Degenerate(_)));
    }

    #[test]
    fn test_invalid_input() {
        let empty: [f64; 0] = [];
        assert!(matches!(
            quantile_bins(&empty, &["a"]).expect_err("empty"),
            AssocError::InputShape(_)
        ));
        let no_labels: [&str; 0] = [];
        assert!(matches!(
            quantile_bins(&[1.0, 2.0], &no_labels).expect_err("no labels"),
            AssocError::InputShape(_)
        ));
    }

    #[test]
    fn test_default_labels() {
        assert_eq!(default_labels(3), vec!["Q1", "Q2", "Q3"]);
    }
}
