//! Distance correlation (Székely, Rizzo & Bakirov) for univariate samples
//!
//! Uses the O(n log n) method of Huo & Székely: row sums of the distance
//! matrices come from sorted prefix sums and the cross term
//! sum |x_i - x_j| |y_i - y_j| from a Fenwick tree over y ranks, so memory
//! stays linear in n.

use crate::stats::correlation::{ensure_variance, validate_pair};
use crate::structs::{AssocError, Association, Method, Result};
use ndarray::Array1;

/// Distance correlation between two sequences.
///
/// Uses the biased (V-statistic) estimator, so the value lies in [0, 1] and is
/// exactly 1 when `y` is `x` up to translation and scaling. No p-value is
/// produced.
///
/// # Errors
/// Returns error on mismatched, short, non-finite or constant input
pub fn distance_correlation(x: &[f64], y: &[f64]) -> Result<Association> {
    validate_pair(x, y)?;
    ensure_variance(x, "x")?;
    ensure_variance(y, "y")?;

    // distances are translation invariant; centring limits cancellation
    let x = centered(x);
    let y = centered(y);

    let a_rows = distance_row_sums(&x);
    let b_rows = distance_row_sums(&y);

    let dcov_xy = squared_dcov(&x, &y, &a_rows, &b_rows);
    let dvar_x = squared_dcov(&x, &x, &a_rows, &a_rows);
    let dvar_y = squared_dcov(&y, &y, &b_rows, &b_rows);

    let denom = (dvar_x * dvar_y).sqrt();
    if denom <= 0.0 {
        return Err(AssocError::Degenerate(
            "distance variance is zero".into(),
        ));
    }

    // the V-statistic dcov^2 is non-negative; rounding can push it just below 0
    let dcor = (dcov_xy.max(0.0) / denom).sqrt().min(1.0);

    Ok(Association {
        method: Method::Distance,
        coefficient: dcor,
        p_value: None,
    })
}

#[allow(clippy::cast_precision_loss)]
fn centered(values: &[f64]) -> Vec<f64> {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| v - mean).collect()
}

/// V-statistic dcov^2 = S1 + S2 - 2 S3 from the double-centring identity
#[allow(clippy::cast_precision_loss)]
fn squared_dcov(x: &[f64], y: &[f64], a_rows: &Array1<f64>, b_rows: &Array1<f64>) -> f64 {
    let n = x.len() as f64;
    let n2 = n * n;

    let s1 = 2.0 * cross_distance_sum(x, y) / n2;
    let s2 = (a_rows.sum() / n2) * (b_rows.sum() / n2);
    let s3 = a_rows.dot(b_rows) / (n2 * n);

    2.0f64.mul_add(-s3, s1 + s2)
}

fn sorted_order(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    order
}

/// `sums[i] = sum_j |v_i - v_j|`
#[allow(clippy::cast_precision_loss)]
fn distance_row_sums(values: &[f64]) -> Array1<f64> {
    let n = values.len();
    let total: f64 = values.iter().sum();
    let mut sums = Array1::zeros(n);

    let mut before = 0.0;
    for (k, &i) in sorted_order(values).iter().enumerate() {
        let v = values[i];
        let after = total - before - v;
        sums[i] = v.mul_add(k as f64, -before) + v.mul_add(-((n - 1 - k) as f64), after);
        before += v;
    }

    sums
}

/// Sum over i < j of |x_i - x_j| * |y_i - y_j|.
///
/// Visiting points in x order makes x_j - x_i non-negative; the sign of
/// y_j - y_i is settled by splitting earlier points into those ranked below
/// and above y_j. Each side keeps [count, sum y, sum x, sum xy] so that
/// sum (x_j - x_i)(y_j - y_i) expands into those four totals.
fn cross_distance_sum(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    let mut y_rank = vec![0usize; n];
    for (rank, &i) in sorted_order(y).iter().enumerate() {
        y_rank[i] = rank;
    }

    let mut tree = Fenwick::new(n);
    let mut seen = [0.0; 4];
    let mut total = 0.0;

    for &j in &sorted_order(x) {
        let (xj, yj) = (x[j], y[j]);
        let below = tree.prefix(y_rank[j]);
        let above: [f64; 4] = std::array::from_fn(|k| seen[k] - below[k]);

        // sum over the given side of (x_j - x_i)(y_j - y_i)
        let expand = |s: [f64; 4]| (xj * yj).mul_add(s[0], yj.mul_add(-s[2], xj.mul_add(-s[1], s[3])));
        total += expand(below) - expand(above);

        let point = [1.0, yj, xj, xj * yj];
        tree.add(y_rank[j], point);
        for (acc, v) in seen.iter_mut().zip(point) {
            *acc += v;
        }
    }

    total
}

/// Binary indexed tree of 4-component sums
struct Fenwick {
    tree: Vec<[f64; 4]>,
}

impl Fenwick {
    fn new(n: usize) -> Self {
        Self {
            tree: vec![[0.0; 4]; n + 1],
        }
    }

    fn add(&mut self, index: usize, value: [f64; 4]) {
        let mut i = index + 1;
        while i < self.tree.len() {
            for (slot, v) in self.tree[i].iter_mut().zip(value) {
                *slot += v;
            }
            i += i & i.wrapping_neg();
        }
    }

    /// Sum of all entries with index < `end`
    fn prefix(&self, end: usize) -> [f64; 4] {
        let mut acc = [0.0; 4];
        let mut i = end;
        while i > 0 {
            for (slot, v) in acc.iter_mut().zip(self.tree[i]) {
                *slot += v;
            }
            i &= i - 1;
        }
        acc
    }
}
