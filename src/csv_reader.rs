use crate::structs::{AssocError, CsvData, Result};
use csv::ReaderBuilder;
use std::path::Path;

impl CsvData {
    /// Parse a CSV or TSV file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is malformed
    pub fn from_file(path: &Path, is_tsv: bool) -> Result<Self> {
        let delimiter = if is_tsv { b'\t' } else { b',' };

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|s| s.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(|s| s.trim().to_string()).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Get number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.headers.len()
    }

    /// Get column index by name
    ///
    /// # Errors
    /// Returns error if no header matches
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| {
                AssocError::Config(format!(
                    "Column '{name}' not found (available: {})",
                    self.headers.join(", ")
                ))
            })
    }

    /// Extract two numeric columns pairwise.
    ///
    /// Rows where either cell is missing or non-numeric are dropped; the number
    /// of dropped rows is returned alongside the pair.
    ///
    /// # Errors
    /// Returns error if either column does not exist
    pub fn numeric_pair(&self, x_name: &str, y_name: &str) -> Result<(Vec<f64>, Vec<f64>, usize)> {
        let xi = self.column_index(x_name)?;
        let yi = self.column_index(y_name)?;

        let mut x = Vec::with_capacity(self.row_count());
        let mut y = Vec::with_capacity(self.row_count());
        let mut dropped = 0;

        for row in &self.rows {
            let parsed = row
                .get(xi)
                .and_then(|s| s.parse::<f64>().ok())
                .zip(row.get(yi).and_then(|s| s.parse::<f64>().ok()));
            match parsed {
                Some((a, b)) if a.is_finite() && b.is_finite() => {
                    x.push(a);
                    y.push(b);
                }
                _ => dropped += 1,
            }
        }

        Ok((x, y, dropped))
    }

    /// Extract two raw columns pairwise, dropping rows where either cell is empty
    ///
    /// # Errors
    /// Returns error if either column does not exist
    pub fn text_pair(&self, x_name: &str, y_name: &str) -> Result<(Vec<&str>, Vec<&str>, usize)> {
        let xi = self.column_index(x_name)?;
        let yi = self.column_index(y_name)?;

        let mut x = Vec::with_capacity(self.row_count());
        let mut y = Vec::with_capacity(self.row_count());
        let mut dropped = 0;

        for row in &self.rows {
            match (row.get(xi), row.get(yi)) {
                (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => {
                    x.push(a.as_str());
                    y.push(b.as_str());
                }
                _ => dropped += 1,
            }
        }

        Ok((x, y, dropped))
    }
}
