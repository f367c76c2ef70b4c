//! Text and JSON rendering of analysis results
//!
//! Everything here is a pure function from result structs to `String`; the
//! CLI decides where the text goes.

use crate::stats::interpret::significance_label;
use crate::structs::{
    Association, ContingencyTable, CorrelationReport, CramerResult, DemoResult, Result, Strength,
};
use serde::Serialize;
use std::fmt::Write as _;

const RULE_WIDTH: usize = 50;

/// Format in scientific notation with `significant` digits and a signed,
/// two-digit exponent (`1.235e-05`)
#[must_use]
pub fn format_scientific(value: f64, significant: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let raw = format!("{:.*e}", significant.saturating_sub(1), value);
    match raw.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => raw,
    }
}

/// Coefficients, p-values and significance for each method of a report
#[must_use]
pub fn render_correlation_report(report: &CorrelationReport, alpha: f64) -> String {
    let mut s = String::from("\nCorrelation Analysis");
    if let Some(name) = report.name.as_deref().filter(|n| !n.is_empty()) {
        let _ = write!(s, ": {name}");
    }
    s.push('\n');
    s.push_str(&"-".repeat(RULE_WIDTH));
    s.push('\n');

    for assoc in report.associations() {
        let _ = writeln!(s, "\n{} Correlation:", assoc.method.display_name());
        let _ = writeln!(s, "  Coefficient: {:.4}", assoc.coefficient);
        if let (Some(p), Some(significant)) = (assoc.p_value, assoc.is_significant(alpha)) {
            let _ = writeln!(s, "  P-value: {}", format_scientific(p, 4));
            let _ = writeln!(
                s,
                "  Significance: {} at α={alpha}",
                significance_label(significant)
            );
        }
    }

    s
}

/// One strength line per method
#[must_use]
pub fn render_interpretation(report: &CorrelationReport) -> String {
    let mut s = String::from("\nInterpretation:\n");
    for assoc in report.associations() {
        let _ = writeln!(
            s,
            "{}: {} relationship",
            assoc.method.display_name(),
            assoc.strength().label()
        );
    }
    s
}

/// Closing rule between relationship blocks
#[must_use]
pub fn render_separator() -> String {
    format!("\n{}\n", "=".repeat(RULE_WIDTH))
}

/// Cramer's V, its chi-square p-value, and the table as counts and column proportions
#[must_use]
pub fn render_cramer(result: &CramerResult, alpha: f64) -> String {
    let mut s = String::from("\nCramer's V Analysis\n");
    s.push_str(&"-".repeat(RULE_WIDTH));
    s.push('\n');

    let _ = writeln!(s, "Cramer's V: {:.4}", result.cramers_v);
    let _ = writeln!(s, "Chi-square p-value: {}", format_scientific(result.p_value, 4));
    let _ = writeln!(
        s,
        "Significance: {} at α={alpha}",
        significance_label(result.p_value < alpha)
    );

    let counts: Vec<Vec<String>> = result
        .table
        .counts
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();
    s.push_str("\nContingency Table (Counts):\n");
    s.push_str(&render_grid(&result.table, &counts));

    let proportions: Vec<Vec<String>> = result
        .table
        .column_proportions()
        .iter()
        .map(|row| row.iter().map(|p| format!("{p:.4}")).collect())
        .collect();
    s.push_str("\nContingency Table (Column Proportions):\n");
    s.push_str(&render_grid(&result.table, &proportions));

    s
}

/// Single-line distance correlation summary
#[must_use]
pub fn render_distance_summary(coefficient: f64) -> String {
    format!("Distance correlation: {coefficient:.3}\n")
}

/// An association with the same strength and significance the text report shows
#[derive(Serialize)]
struct AssociationJson<'a> {
    #[serde(flatten)]
    association: &'a Association,
    strength: Strength,
    significant: Option<bool>,
}

impl<'a> AssociationJson<'a> {
    fn new(association: &'a Association, alpha: f64) -> Self {
        Self {
            association,
            strength: association.strength(),
            significant: association.is_significant(alpha),
        }
    }
}

#[derive(Serialize)]
struct ReportJson<'a> {
    name: Option<&'a str>,
    n: usize,
    alpha: f64,
    pearson: AssociationJson<'a>,
    spearman: AssociationJson<'a>,
    kendall: AssociationJson<'a>,
    distance: AssociationJson<'a>,
}

impl<'a> ReportJson<'a> {
    fn new(report: &'a CorrelationReport, alpha: f64) -> Self {
        Self {
            name: report.name.as_deref(),
            n: report.n,
            alpha,
            pearson: AssociationJson::new(&report.pearson, alpha),
            spearman: AssociationJson::new(&report.spearman, alpha),
            kendall: AssociationJson::new(&report.kendall, alpha),
            distance: AssociationJson::new(&report.distance, alpha),
        }
    }
}

#[derive(Serialize)]
struct CramerJson<'a> {
    #[serde(flatten)]
    result: &'a CramerResult,
    alpha: f64,
    significant: bool,
}

impl<'a> CramerJson<'a> {
    fn new(result: &'a CramerResult, alpha: f64) -> Self {
        Self {
            result,
            alpha,
            significant: result.p_value < alpha,
        }
    }
}

#[derive(Serialize)]
struct DemoJson<'a> {
    reports: Vec<ReportJson<'a>>,
    cramer: CramerJson<'a>,
}

/// Pretty JSON of a correlation report, with strength and significance per method
///
/// # Errors
/// Returns error if serialization fails
pub fn render_report_json(report: &CorrelationReport, alpha: f64) -> Result<String> {
    render_json(&ReportJson::new(report, alpha))
}

/// Pretty JSON of a Cramer's V result with its significance at `alpha`
///
/// # Errors
/// Returns error if serialization fails
pub fn render_cramer_json(result: &CramerResult, alpha: f64) -> Result<String> {
    render_json(&CramerJson::new(result, alpha))
}

/// Pretty JSON of the whole demo
///
/// # Errors
/// Returns error if serialization fails
pub fn render_demo_json(result: &DemoResult, alpha: f64) -> Result<String> {
    render_json(&DemoJson {
        reports: result
            .reports
            .iter()
            .map(|r| ReportJson::new(r, alpha))
            .collect(),
        cramer: CramerJson::new(&result.cramer, alpha),
    })
}

fn render_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Right-aligned grid with row labels in the first column
fn render_grid(table: &ContingencyTable, cells: &[Vec<String>]) -> String {
    let label_width = table
        .row_labels
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0);

    let widths: Vec<usize> = table
        .col_labels
        .iter()
        .enumerate()
        .map(|(j, label)| {
            cells
                .iter()
                .filter_map(|row| row.get(j).map(String::len))
                .chain(std::iter::once(label.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut s = format!("{:label_width$}", "");
    for (label, width) in table.col_labels.iter().zip(widths.iter().copied()) {
        let _ = write!(s, "  {label:>width$}");
    }
    s.push('\n');

    for (label, row) in table.row_labels.iter().zip(cells) {
        let _ = write!(s, "{label:<label_width$}");
        for (cell, width) in row.iter().zip(widths.iter().copied()) {
            let _ = write!(s, "  {cell:>width$}");
        }
        s.push('\n');
    }

    s
}
