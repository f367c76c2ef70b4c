//! Analysis pipeline that orchestrates the association computations

use crate::stats::binning::quantile_bins;
use crate::stats::categorical::cramers_v;
use crate::stats::correlation::{kendall, pearson, spearman};
use crate::stats::distance::distance_correlation;
use crate::structs::{
    Categorical, ContingencyTable, CorrelationReport, CramerResult, DemoResult, Result, SampleData,
};

/// Configuration shared by the analysis commands
#[derive(Debug, Clone, Copy)]
pub struct AnalysisConfig {
    /// Significance level for the report wording
    pub alpha: f64,
    /// Apply Yates' continuity correction to 2x2 chi-square tests
    pub yates: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            yates: false,
        }
    }
}

const DEMO_X_BINS: [&str; 4] = ["A", "B", "C", "D"];
const DEMO_Y_BINS: [&str; 3] = ["Low", "Medium", "High"];

/// Compute all four association statistics for one pair.
///
/// Any failure aborts the whole report; there are no partial results.
///
/// # Errors
/// Returns error on mismatched, short, non-finite or constant input
pub fn analyze_correlations(x: &[f64], y: &[f64], name: Option<&str>) -> Result<CorrelationReport> {
    Ok(CorrelationReport {
        name: name.map(str::to_string),
        n: x.len(),
        pearson: pearson(x, y)?,
        spearman: spearman(x, y)?,
        kendall: kendall(x, y)?,
        distance: distance_correlation(x, y)?,
    })
}

/// Cross-tabulate two categorical variables and compute Cramer's V
///
/// # Errors
/// Returns error if the variables differ in length or the table is degenerate
pub fn analyze_categorical(
    x: &Categorical,
    y: &Categorical,
    config: &AnalysisConfig,
) -> Result<CramerResult> {
    let table = ContingencyTable::from_categoricals(x, y)?;
    cramers_v(&table, config.yates)
}

/// Run the correlation demo over generated sample data.
///
/// Each pair gets a full report; the linear pair is then binned into
/// quartiles (x) and terciles (y) for the Cramer's V example.
///
/// # Errors
/// Returns the first error from any report or the categorical analysis
pub fn run_demo(data: &SampleData, config: &AnalysisConfig) -> Result<DemoResult> {
    let reports = data
        .pairs()
        .iter()
        .map(|pair| analyze_correlations(&pair.x, &pair.y, Some(pair.name.as_str())))
        .collect::<Result<Vec<_>>>()?;

    let cat_x = quantile_bins(&data.linear.x, &DEMO_X_BINS)?;
    let cat_y = quantile_bins(&data.linear.y, &DEMO_Y_BINS)?;
    let cramer = analyze_categorical(&cat_x, &cat_y, config)?;

    Ok(DemoResult { reports, cramer })
}
