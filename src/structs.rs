//! Consolidated public types for the assoc crate
//!
//! This module contains all public structs, enums, and the error type used across the crate.

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum AssocError {
    #[error("Input shape error: {0}")]
    InputShape(String),

    #[error("Degenerate input: {0}")]
    Degenerate(String),

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AssocError>;

// ============================================================================
// CSV Types
// ============================================================================

/// Represents a parsed CSV/TSV file with headers and rows
#[derive(Debug, Clone)]
pub struct CsvData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

// ============================================================================
// Association Types
// ============================================================================

/// Association measure for a pair of numeric sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Pearson,
    Spearman,
    Kendall,
    Distance,
}

impl Method {
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Pearson => "Pearson",
            Self::Spearman => "Spearman",
            Self::Kendall => "Kendall",
            Self::Distance => "Distance",
        }
    }
}

/// Qualitative strength of an association coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    Negligible,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl Strength {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Negligible => "Negligible",
            Self::Weak => "Weak",
            Self::Moderate => "Moderate",
            Self::Strong => "Strong",
            Self::VeryStrong => "Very Strong",
        }
    }
}

/// One association statistic computed on a pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Association {
    pub method: Method,
    pub coefficient: f64,
    /// `None` for distance correlation
    pub p_value: Option<f64>,
}

impl Association {
    /// Whether the p-value falls below `alpha`; `None` when there is no p-value
    #[must_use]
    pub fn is_significant(&self, alpha: f64) -> Option<bool> {
        self.p_value.map(|p| p < alpha)
    }
}

/// The four association statistics for one (x, y) pair
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationReport {
    pub name: Option<String>,
    pub n: usize,
    pub pearson: Association,
    pub spearman: Association,
    pub kendall: Association,
    pub distance: Association,
}

impl CorrelationReport {
    /// Results in report order: Pearson, Spearman, Kendall, Distance
    #[must_use]
    pub fn associations(&self) -> [&Association; 4] {
        [&self.pearson, &self.spearman, &self.kendall, &self.distance]
    }
}

// ============================================================================
// Categorical Types
// ============================================================================

/// A categorical variable: ordered category labels plus one code per observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Categorical {
    pub labels: Vec<String>,
    pub codes: Vec<usize>,
}

impl Categorical {
    /// Number of observations
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[allow(dead_code)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Number of categories
    #[must_use]
    pub fn n_categories(&self) -> usize {
        self.labels.len()
    }

    /// Label of the i-th observation
    #[allow(dead_code)]
    #[must_use]
    pub fn label_at(&self, index: usize) -> Option<&str> {
        self.codes
            .get(index)
            .and_then(|&c| self.labels.get(c))
            .map(String::as_str)
    }
}

/// Cross-tabulated joint counts of two categorical variables
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContingencyTable {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    /// `counts[row][col]`
    pub counts: Vec<Vec<u64>>,
}

/// Chi-square test of independence on a contingency table
#[derive(Debug, Clone, Serialize)]
pub struct ChiSquareTest {
    pub chi2: f64,
    pub p_value: f64,
    pub dof: usize,
    pub expected: Vec<Vec<f64>>,
}

/// Cramer's V with the chi-square test it was derived from
#[derive(Debug, Clone, Serialize)]
pub struct CramerResult {
    pub cramers_v: f64,
    pub chi2: f64,
    pub p_value: f64,
    pub dof: usize,
    pub n: u64,
    pub table: ContingencyTable,
}

// ============================================================================
// Sample Data Types
// ============================================================================

/// A named (x, y) pair of equal-length sequences
#[derive(Debug, Clone, Serialize)]
pub struct Pair {
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Synthetic pairs with linear, monotonic and non-monotonic relationships
#[derive(Debug, Clone, Serialize)]
pub struct SampleData {
    pub linear: Pair,
    pub monotonic: Pair,
    pub nonlinear: Pair,
}

impl SampleData {
    /// Pairs in presentation order
    #[must_use]
    pub fn pairs(&self) -> [&Pair; 3] {
        [&self.linear, &self.monotonic, &self.nonlinear]
    }
}

/// Everything the correlation demo computes
#[derive(Debug, Clone, Serialize)]
pub struct DemoResult {
    pub reports: Vec<CorrelationReport>,
    pub cramer: CramerResult,
}
