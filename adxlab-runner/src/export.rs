//! Artifact export: processed table, chart payload and run manifest.
//!
//! Provides three artifact formats for a computed run:
//! - **CSV**: the full table, input columns first, undefined cells empty
//! - **Parquet**: the same table with nulls for undefined cells
//! - **JSON**: the chart payload (ADX, +DI14, -DI14 by row index)
//!
//! Every run directory also gets a `manifest.json` carrying a
//! `schema_version` field. Unknown versions are rejected on load.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use adxlab_core::ComputedRow;

use crate::config::OutputFormat;
use crate::runner::RunResult;
use crate::summary::{DirectionalBias, LatestValues, Onset, TrendStrength};

/// Current schema version for persisted manifests.
pub const SCHEMA_VERSION: u32 = 1;

/// Base name of the processed table inside a run directory.
pub const PROCESSED_STEM: &str = "processed_adx_output";

// ─── Table export ───────────────────────────────────────────────────

/// Write a table as CSV with a header row. Nulls become empty fields.
pub fn write_csv(df: &DataFrame, path: &Path) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut df = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .with_context(|| format!("failed to write CSV {}", path.display()))?;
    Ok(())
}

/// Write a table as Parquet.
pub fn write_parquet(df: &DataFrame, path: &Path) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut df = df.clone();
    ParquetWriter::new(&mut file)
        .finish(&mut df)
        .with_context(|| format!("failed to write Parquet {}", path.display()))?;
    Ok(())
}

// ─── Chart payload ──────────────────────────────────────────────────

/// Series for an ADX / DI line chart. `None` serializes as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub x: Vec<usize>,
    pub adx: Vec<Option<f64>>,
    pub plus_di14: Vec<Option<f64>>,
    pub minus_di14: Vec<Option<f64>>,
}

pub fn chart_series(rows: &[ComputedRow]) -> ChartSeries {
    ChartSeries {
        x: (0..rows.len()).collect(),
        adx: rows.iter().map(|r| r.adx).collect(),
        plus_di14: rows.iter().map(|r| r.plus_di14).collect(),
        minus_di14: rows.iter().map(|r| r.minus_di14).collect(),
    }
}

pub fn write_chart_json(rows: &[ComputedRow], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&chart_series(rows))
        .context("failed to serialize chart series")?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

// ─── Manifest ───────────────────────────────────────────────────────

/// Provenance and headline values of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub generated_at: String,
    pub input: String,
    pub period: usize,
    pub row_count: usize,
    /// BLAKE3 over the High/Low/Close values.
    pub dataset_hash: String,
    pub config_hash: String,
    pub onset: Onset,
    pub latest: LatestValues,
    pub strength: Option<TrendStrength>,
    pub bias: Option<DirectionalBias>,
    /// Files written next to the manifest.
    #[serde(default)]
    pub artifacts: Vec<String>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl RunManifest {
    pub fn from_result(result: &RunResult) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            generated_at: chrono::Local::now().to_rfc3339(),
            input: result.input.display().to_string(),
            period: result.period,
            row_count: result.rows.len(),
            dataset_hash: result.dataset_hash.clone(),
            config_hash: result.config_hash.clone(),
            onset: result.summary.onset,
            latest: result.summary.latest,
            strength: result.summary.strength,
            bias: result.summary.bias,
            artifacts: Vec::new(),
        }
    }
}

/// Deserialize a manifest, rejecting unknown schema versions.
pub fn import_manifest(json: &str) -> Result<RunManifest> {
    let manifest: RunManifest =
        serde_json::from_str(json).context("failed to deserialize RunManifest from JSON")?;
    if manifest.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set for a single run.
///
/// Creates a directory named `{input_stem}_{timestamp}/` under `output_dir`
/// containing, per selected format:
/// - `processed_adx_output.csv` / `processed_adx_output.parquet`
/// - `chart.json`
///
/// plus `manifest.json` in every case. Returns the created directory.
pub fn save_artifacts(
    result: &RunResult,
    output_dir: &Path,
    formats: &[OutputFormat],
) -> Result<PathBuf> {
    let stem = result
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("run");
    let dirname = format!("{}_{}", stem, chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let mut manifest = RunManifest::from_result(result);
    for &format in formats {
        let name = match format {
            OutputFormat::Csv => {
                let name = format!("{PROCESSED_STEM}.csv");
                write_csv(&result.frame, &run_dir.join(&name))?;
                name
            }
            OutputFormat::Parquet => {
                let name = format!("{PROCESSED_STEM}.parquet");
                write_parquet(&result.frame, &run_dir.join(&name))?;
                name
            }
            OutputFormat::Json => {
                let name = "chart.json".to_string();
                write_chart_json(&result.rows, &run_dir.join(&name))?;
                name
            }
        };
        if !manifest.artifacts.contains(&name) {
            manifest.artifacts.push(name);
        }
    }

    let json =
        serde_json::to_string_pretty(&manifest).context("failed to serialize RunManifest")?;
    std::fs::write(run_dir.join("manifest.json"), json)?;

    info!(dir = %run_dir.display(), artifacts = ?manifest.artifacts, "artifacts written");
    Ok(run_dir)
}

/// Load the manifest from an artifact directory.
pub fn load_manifest(dir: &Path) -> Result<RunManifest> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_manifest(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use adxlab_core::{compute, Bar};

    fn rows() -> Vec<ComputedRow> {
        let bars: Vec<Bar> = (0..6)
            .map(|i| {
                let i = i as f64;
                Bar::new(10.0 + i, 9.0 + i, 9.5 + i)
            })
            .collect();
        compute(&bars, 2)
    }

    #[test]
    fn chart_series_keeps_undefined_as_none() {
        let series = chart_series(&rows());
        assert_eq!(series.x, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(series.adx[..3], [None, None, None]);
        assert!(series.adx[3].is_some());
        assert!(series.plus_di14[1].is_none());
        assert!(series.plus_di14[2].is_some());
    }

    #[test]
    fn chart_json_uses_null() {
        let json = serde_json::to_string(&chart_series(&rows())).unwrap();
        assert!(json.starts_with("{\"x\":[0,1,2,3,4,5],\"adx\":[null,null,null,"));
    }

    #[test]
    fn csv_writes_empty_cells_for_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let df = DataFrame::new(vec![
            Column::new("High".into(), &[2.0, 3.0]),
            Column::new("TR".into(), &[None, Some(1.5)]),
        ])
        .unwrap();
        write_csv(&df, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<Vec<&str>> = text.lines().map(|l| l.split(',').collect()).collect();
        assert_eq!(lines[0], ["High", "TR"]);
        assert_eq!(lines[1][0].parse::<f64>().unwrap(), 2.0);
        assert_eq!(lines[1][1], "");
        assert_eq!(lines[2][1].parse::<f64>().unwrap(), 1.5);
    }

    #[test]
    fn import_rejects_future_schema_version() {
        let manifest = RunManifest {
            schema_version: SCHEMA_VERSION + 1,
            generated_at: "2024-01-01T00:00:00+00:00".into(),
            input: "prices.csv".into(),
            period: 14,
            row_count: 0,
            dataset_hash: String::new(),
            config_hash: String::new(),
            onset: Onset::default(),
            latest: LatestValues::default(),
            strength: None,
            bias: None,
            artifacts: vec![],
        };
        let json = serde_json::to_string(&manifest).unwrap();
        let err = import_manifest(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported schema version"));
    }
}
