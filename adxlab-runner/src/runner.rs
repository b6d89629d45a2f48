//! Run orchestration: ingest, compute, summarize, optionally verify.

use std::path::PathBuf;

use polars::prelude::DataFrame;
use thiserror::Error;
use tracing::{debug, info, warn};

use adxlab_core::data::schema::SchemaError;
use adxlab_core::{compute_table, Bar, ComputedRow, DataError, DataIngestor, FrameError};

use crate::config::{ConfigError, RunConfig};
use crate::summary::{summarize, RunSummary};
use crate::verify::{verify_frames, VerifyReport};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// Everything produced by one run, ready for export.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub input: PathBuf,
    pub period: usize,
    /// Input columns followed by the ten derived columns.
    pub frame: DataFrame,
    pub rows: Vec<ComputedRow>,
    pub summary: RunSummary,
    pub dataset_hash: String,
    pub config_hash: String,
    /// Present when the config has a `[verify]` section.
    pub verify: Option<VerifyReport>,
}

/// Run the full pipeline for a config.
pub fn run_from_config(config: &RunConfig) -> Result<RunResult, RunError> {
    config.validate()?;
    let period = config.run.period;
    let ingestor = DataIngestor::new();

    let input = ingestor.ingest_path(&config.run.input)?;
    debug!(rows = input.height(), columns = input.width(), "input loaded");
    if input.height() == 0 {
        warn!(input = %config.run.input.display(), "input has no rows");
    }

    let table = compute_table(&input, period)?;
    let summary = summarize(&table.rows);
    let bars: Vec<Bar> = table.rows.iter().map(|r| r.bar).collect();

    let verify = match &config.verify {
        Some(section) => {
            let expected = ingestor.ingest_path(&section.reference)?;
            let report = verify_frames(
                &table.frame,
                &expected,
                &section.output_columns()?,
                section.tolerance,
            )?;
            info!(
                mismatches = report.mismatches.len(),
                compared_rows = report.compared_rows,
                "verified against reference"
            );
            Some(report)
        }
        None => None,
    };

    Ok(RunResult {
        input: config.run.input.clone(),
        period,
        frame: table.frame,
        rows: table.rows,
        summary,
        dataset_hash: dataset_hash(&bars),
        config_hash: config.config_hash()?,
        verify,
    })
}

/// BLAKE3 over the High/Low/Close values in row order.
pub fn dataset_hash(bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
