//! Contingency tables, the chi-square test of independence, and Cramer's V

use crate::structs::{AssocError, Categorical, ChiSquareTest, ContingencyTable, CramerResult, Result};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use std::collections::BTreeMap;

impl Categorical {
    /// Build a categorical variable from raw labels; categories are sorted
    #[must_use]
    pub fn from_labels<S: AsRef<str>>(values: &[S]) -> Self {
        let mut index: BTreeMap<&str, usize> = BTreeMap::new();
        for v in values {
            index.insert(v.as_ref(), 0);
        }
        for (code, slot) in index.values_mut().enumerate() {
            *slot = code;
        }

        let codes = values.iter().map(|v| index[v.as_ref()]).collect();
        let labels = index.keys().map(|k| (*k).to_string()).collect();

        Self { labels, codes }
    }

    /// Treat each distinct number as a category; categories are ordered by value
    #[must_use]
    pub fn from_numeric(values: &[f64]) -> Self {
        let mut distinct = values.to_vec();
        distinct.sort_by(f64::total_cmp);
        distinct.dedup_by(|a, b| a.total_cmp(b).is_eq());

        let codes = values
            .iter()
            .map(|v| {
                distinct
                    .binary_search_by(|candidate| candidate.total_cmp(v))
                    .unwrap_or_default()
            })
            .collect();
        let labels = distinct.iter().map(ToString::to_string).collect();

        Self { labels, codes }
    }
}

impl ContingencyTable {
    /// Cross-tabulate two categorical variables observed on the same units
    ///
    /// # Errors
    /// Returns `InputShape` if the variables differ in length or a code is out of range
    pub fn from_categoricals(rows: &Categorical, cols: &Categorical) -> Result<Self> {
        if rows.len() != cols.len() {
            return Err(AssocError::InputShape(format!(
                "Categorical variables must have same length (got {} and {})",
                rows.len(),
                cols.len()
            )));
        }

        let mut counts = vec![vec![0u64; cols.n_categories()]; rows.n_categories()];
        for (&r, &c) in rows.codes.iter().zip(&cols.codes) {
            let cell = counts
                .get_mut(r)
                .and_then(|row| row.get_mut(c))
                .ok_or_else(|| {
                    AssocError::InputShape(format!("Category code ({r}, {c}) out of range"))
                })?;
            *cell += 1;
        }

        Self::from_counts(rows.labels.clone(), cols.labels.clone(), counts)
    }

    /// Build a table directly from a count matrix
    ///
    /// # Errors
    /// Returns `InputShape` if the matrix does not match the label dimensions
    pub fn from_counts(
        row_labels: Vec<String>,
        col_labels: Vec<String>,
        counts: Vec<Vec<u64>>,
    ) -> Result<Self> {
        if counts.len() != row_labels.len() || counts.iter().any(|r| r.len() != col_labels.len()) {
            return Err(AssocError::InputShape(format!(
                "Count matrix must be {}x{}",
                row_labels.len(),
                col_labels.len()
            )));
        }
        Ok(Self {
            row_labels,
            col_labels,
            counts,
        })
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.row_labels.len()
    }

    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.col_labels.len()
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    #[must_use]
    pub fn row_totals(&self) -> Vec<u64> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }

    #[must_use]
    pub fn col_totals(&self) -> Vec<u64> {
        let mut totals = vec![0u64; self.n_cols()];
        for row in &self.counts {
            for (t, &c) in totals.iter_mut().zip(row) {
                *t += c;
            }
        }
        totals
    }

    /// Each count divided by its column total (empty columns give 0)
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn column_proportions(&self) -> Vec<Vec<f64>> {
        let totals = self.col_totals();
        self.counts
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&totals)
                    .map(|(&c, &t)| if t == 0 { 0.0 } else { c as f64 / t as f64 })
                    .collect()
            })
            .collect()
    }
}

/// Pearson chi-square test of independence.
///
/// With `yates` set, a table with one degree of freedom has each |O - E|
/// reduced by up to 0.5 before squaring.
///
/// # Errors
/// Returns `Degenerate` for fewer than 2 rows or columns, an empty table, or
/// any zero expected count; `Computation` if the chi-square distribution fails
#[allow(clippy::cast_precision_loss)]
pub fn chi_square_test(table: &ContingencyTable, yates: bool) -> Result<ChiSquareTest> {
    let (n_rows, n_cols) = (table.n_rows(), table.n_cols());
    if n_rows < 2 || n_cols < 2 {
        return Err(AssocError::Degenerate(format!(
            "Contingency table needs at least 2 categories per variable (got {n_rows}x{n_cols})"
        )));
    }

    let total = table.total();
    if total == 0 {
        return Err(AssocError::Degenerate("Contingency table is empty".into()));
    }

    let row_totals = table.row_totals();
    let col_totals = table.col_totals();
    let dof = (n_rows - 1) * (n_cols - 1);
    let correct = yates && dof == 1;

    let mut expected = vec![vec![0.0; n_cols]; n_rows];
    let mut chi2 = 0.0;

    for (i, row) in table.counts.iter().enumerate() {
        for (j, &observed) in row.iter().enumerate() {
            let e = row_totals[i] as f64 * col_totals[j] as f64 / total as f64;
            if e == 0.0 {
                return Err(AssocError::Degenerate(format!(
                    "Expected count is zero for ({}, {})",
                    table.row_labels[i], table.col_labels[j]
                )));
            }
            expected[i][j] = e;

            let mut diff = (observed as f64 - e).abs();
            if correct {
                diff -= diff.min(0.5);
            }
            chi2 += diff * diff / e;
        }
    }

    let dist = ChiSquared::new(dof as f64)
        .map_err(|e| AssocError::Computation(format!("chi-square (dof={dof}): {e}")))?;

    Ok(ChiSquareTest {
        chi2,
        p_value: dist.sf(chi2).clamp(0.0, 1.0),
        dof,
        expected,
    })
}

/// Cramer's V = sqrt(chi2 / (n * min(rows - 1, cols - 1)))
///
/// # Errors
/// Propagates the chi-square test's errors
#[allow(clippy::cast_precision_loss)]
pub fn cramers_v(table: &ContingencyTable, yates: bool) -> Result<CramerResult> {
    let test = chi_square_test(table, yates)?;
    let n = table.total();
    let min_dim = table.n_rows().min(table.n_cols()) - 1;

    let v = (test.chi2 / (n as f64 * min_dim as f64)).sqrt().min(1.0);

    Ok(CramerResult {
        cramers_v: v,
        chi2: test.chi2,
        p_value: test.p_value,
        dof: test.dof,
        n,
        table: table.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    fn two_by_two() -> ContingencyTable {
        ContingencyTable::from_counts(
            labels(&["a", "b"]),
            labels(&["x", "y"]),
            vec![vec![10, 20], vec![30, 40]],
        )
        .expect("table")
    }

    #[test]
    fn test_from_labels_sorts_categories() {
        let cat = Categorical::from_labels(&["red", "blue", "red", "green"]);
        assert_eq!(cat.labels, vec!["blue", "green", "red"]);
        assert_eq!(cat.codes, vec![2, 0, 2, 1]);
    }

    #[test]
    fn test_from_numeric_orders_by_value() {
        let cat = Categorical::from_numeric(&[10.0, 9.0, 2.5, 10.0, -1.0]);
        assert_eq!(cat.labels, vec!["-1", "2.5", "9", "10"]);
        assert_eq!(cat.codes, vec![3, 2, 1, 3, 0]);
    }

    #[test]
    fn test_crosstab() {
        let x = Categorical::from_labels(&["a", "a", "b", "b", "b"]);
        let y = Categorical::from_labels(&["u", "v", "u", "u", "v"]);
        let table = ContingencyTable::from_categoricals(&x, &y).expect("table");

        assert_eq!(table.counts, vec![vec![1, 1], vec![2, 1]]);
        assert_eq!(table.total(), 5);
        assert_eq!(table.row_totals(), vec![2, 3]);
        assert_eq!(table.col_totals(), vec![3, 2]);
    }

    #[test]
    fn test_column_proportions() {
        let props = two_by_two().column_proportions();
        assert!((props[0][0] - 0.25).abs() < 1e-12);
        assert!((props[1][0] - 0.75).abs() < 1e-12);
        assert!((props[0][1] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_chi_square() {
        let test = chi_square_test(&two_by_two(), false).expect("chi2");

        assert_eq!(test.dof, 1);
        assert!((test.chi2 - 0.793_650_793_650_793_6).abs() < 1e-12);
        assert!((test.p_value - 0.372_998_483_613_487_1).abs() < 1e-9);
        assert!((test.expected[0][0] - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_yates_correction() {
        let test = chi_square_test(&two_by_two(), true).expect("chi2");

        assert!((test.chi2 - 0.446_428_571_428_571_4).abs() < 1e-12);
        assert!((test.p_value - 0.504_035_866_452_504_8).abs() < 1e-9);
    }

    #[test]
    fn test_cramers_v_value() {
        let result = cramers_v(&two_by_two(), false).expect("cramer");
        assert!((result.cramers_v - 0.089_087_080_637_474_8).abs() < 1e-12);
        assert_eq!(result.n, 100);
    }

    #[test]
    fn test_one_to_one_mapping() {
        let x: Vec<&str> = ["a", "b", "c"].iter().copied().cycle().take(30).collect();
        let y: Vec<String> = x.iter().map(|s| s.to_uppercase()).collect();
        let table = ContingencyTable::from_categoricals(
            &Categorical::from_labels(&x),
            &Categorical::from_labels(&y),
        )
        .expect("table");

        let result = cramers_v(&table, false).expect("cramer");
        assert!((result.cramers_v - 1.0).abs() < 1e-12);
        assert_eq!(result.dof, 4);
        assert!(result.p_value < 1e-5);
    }

    #[test]
    fn test_one_to_one_two_by_two() {
        let x = Categorical::from_labels(&["a", "b", "a", "b", "a", "b"]);
        let y = Categorical::from_labels(&["no", "yes", "no", "yes", "no", "yes"]);
        let table = ContingencyTable::from_categoricals(&x, &y).expect("table");

        let plain = cramers_v(&table, false).expect("cramer");
        assert!((plain.cramers_v - 1.0).abs() < 1e-12);

        // the continuity correction shrinks V below 1 on small 2x2 tables
        let corrected = cramers_v(&table, true).expect("cramer");
        assert!(corrected.cramers_v < plain.cramers_v);
    }

    #[test]
    fn test_independent_is_zero() {
        let table = ContingencyTable::from_counts(
            labels(&["a", "b"]),
            labels(&["x", "y", "z"]),
            vec![vec![10, 20, 30], vec![20, 40, 60]],
        )
        .expect("table");

        let result = cramers_v(&table, false).expect("cramer");
        assert!(result.cramers_v.abs() < 1e-12);
        assert!((result.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_category_is_degenerate() {
        let x = Categorical::from_labels(&["a", "a", "a"]);
        let y = Categorical::from_labels(&["u", "v", "u"]);
        let table = ContingencyTable::from_categoricals(&x, &y).expect("table");

        let err = cramers_v(&table, false).expect_err("degenerate");
        assert!(matches!(err, AssocError::Degenerate(_)));
    }

    #[test]
    fn test_zero_expected_cell() {
        let table = ContingencyTable::from_counts(
            labels(&["a", "b", "c"]),
            labels(&["x", "y"]),
            vec![vec![5, 3], vec![0, 0], vec![2, 7]],
        )
        .expect("table");

        let err = chi_square_test(&table, false).expect_err("zero expected");
        assert!(matches!(err, AssocError::Degenerate(_)));
    }

    #[test]
    fn test_shape_errors() {
        let x = Categorical::from_labels(&["a", "b"]);
        let y = Categorical::from_labels(&["u", "v", "w"]);
        assert!(matches!(
            ContingencyTable::from_categoricals(&x, &y).expect_err("length"),
            AssocError::InputShape(_)
        ));

        assert!(matches!(
            ContingencyTable::from_counts(labels(&["a"]), labels(&["x", "y"]), vec![vec![1]])
                .expect_err("shape"),
            AssocError::InputShape(_)
        ));
    }
}
