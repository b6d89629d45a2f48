//! Cell-by-cell comparison of a computed table against a reference table.
//!
//! Two cells match when both are undefined (null or NaN), or both are
//! defined and differ by at most the absolute tolerance. Only the first
//! `min(len)` rows are compared. A column absent from either table is
//! reported, not counted as a mismatch.

use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use adxlab_core::data::schema::{numeric_column, SchemaError};
use adxlab_core::{compute_frame, DataIngestor, OutputColumn};

use crate::runner::RunError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mismatch {
    pub column: OutputColumn,
    pub row: usize,
    pub got: Option<f64>,
    pub expected: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerifyReport {
    pub compared_rows: usize,
    pub checked_columns: Vec<OutputColumn>,
    pub missing_columns: Vec<OutputColumn>,
    pub mismatches: Vec<Mismatch>,
}

impl VerifyReport {
    /// At least one column compared and no cell differed.
    pub fn is_success(&self) -> bool {
        !self.checked_columns.is_empty() && self.mismatches.is_empty()
    }
}

/// NaN is treated as undefined, like a null cell.
fn defined(v: Option<f64>) -> Option<f64> {
    v.filter(|x| !x.is_nan())
}

pub fn cells_match(got: Option<f64>, expected: Option<f64>, tolerance: f64) -> bool {
    match (defined(got), defined(expected)) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b || (a - b).abs() <= tolerance,
        _ => false,
    }
}

/// Compare `columns` of `output` against `expected`.
pub fn verify_frames(
    output: &DataFrame,
    expected: &DataFrame,
    columns: &[OutputColumn],
    tolerance: f64,
) -> Result<VerifyReport, SchemaError> {
    let compared_rows = output.height().min(expected.height());
    if output.height() != expected.height() {
        warn!(
            output_rows = output.height(),
            expected_rows = expected.height(),
            compared_rows,
            "row counts differ; comparing the shorter length"
        );
    }

    let mut report = VerifyReport {
        compared_rows,
        ..VerifyReport::default()
    };

    for &column in columns {
        let name = column.name();
        if output.column(name).is_err() || expected.column(name).is_err() {
            report.missing_columns.push(column);
            continue;
        }
        let got = numeric_column(output, name)?;
        let want = numeric_column(expected, name)?;

        let before = report.mismatches.len();
        for row in 0..compared_rows {
            if !cells_match(got[row], want[row], tolerance) {
                report.mismatches.push(Mismatch {
                    column,
                    row,
                    got: defined(got[row]),
                    expected: defined(want[row]),
                });
            }
        }
        debug!(column = name, mismatches = report.mismatches.len() - before, "column compared");
        report.checked_columns.push(column);
    }

    if !report.mismatches.is_empty() {
        warn!(mismatches = report.mismatches.len(), "output differs from reference");
    }
    Ok(report)
}

/// Ingest `input` and `reference`, compute, and compare.
pub fn verify_file(
    input: &Path,
    reference: &Path,
    period: usize,
    columns: &[OutputColumn],
    tolerance: f64,
) -> Result<VerifyReport, RunError> {
    let ingestor = DataIngestor::new();
    let output = compute_frame(&ingestor.ingest_path(input)?, period)?;
    let expected = ingestor.ingest_path(reference)?;
    Ok(verify_frames(&output, &expected, columns, tolerance)?)
}

/// Write mismatches as `column,row,got,expected`; undefined sides are empty.
pub fn write_mismatch_csv(report: &VerifyReport, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    wtr.write_record(["column", "row", "got", "expected"])?;
    let cell = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
    for m in &report.mismatches {
        wtr.write_record([
            m.column.name().to_string(),
            m.row.to_string(),
            cell(m.got),
            cell(m.expected),
        ])?;
    }
    wtr.flush().context("failed to flush mismatch report")?;
    Ok(())
}
