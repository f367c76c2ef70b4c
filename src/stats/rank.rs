//! Rank transforms and tie bookkeeping shared by the rank correlations

use std::cmp::Ordering;

/// Assign 1-based ranks, giving tied values the mean of the ranks they span
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0.0; n];
    let mut start = 0;
    while start < n {
        let mut end = start;
        while end + 1 < n && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        // positions start..=end share ranks start+1..=end+1
        let rank = (start + end) as f64 / 2.0 + 1.0;
        for &idx in &order[start..=end] {
            ranks[idx] = rank;
        }
        start = end + 1;
    }

    ranks
}

/// Sizes of tie groups in a sequence, reduced to the sums the Kendall variance needs
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TieSummary {
    /// Number of tied pairs: sum of t(t-1)/2
    pub pairs: u64,
    /// Sum of t(t-1)(t-2)
    pub cubic: f64,
    /// Sum of t(t-1)(2t+5)
    pub variance: f64,
}

impl TieSummary {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn of(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let mut summary = Self::default();
        for group in sorted.chunk_by(|a, b| a == b) {
            let t = group.len() as u64;
            if t > 1 {
                let tf = t as f64;
                summary.pairs += t * (t - 1) / 2;
                summary.cubic += tf * (tf - 1.0) * (tf - 2.0);
                summary.variance += tf * (tf - 1.0) * 2.0f64.mul_add(tf, 5.0);
            }
        }
        summary
    }

    #[must_use]
    pub fn has_ties(&self) -> bool {
        self.pairs > 0
    }
}
