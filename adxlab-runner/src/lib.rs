//! ADX Lab Runner — run orchestration on top of `adxlab-core`.
//!
//! This crate builds on `adxlab-core` to provide:
//! - TOML run configuration with a content hash
//! - The ingest → compute → summarize → verify pipeline
//! - Artifact export (CSV, Parquet, chart JSON, manifest)
//! - Cell-by-cell verification against a reference table
//! - Deterministic synthetic price tables

pub mod config;
pub mod export;
pub mod runner;
pub mod summary;
pub mod synthetic;
pub mod verify;

pub use config::{ConfigError, OutputFormat, RunConfig, VerifySection, DEFAULT_TOLERANCE};
pub use export::{save_artifacts, ChartSeries, RunManifest, SCHEMA_VERSION};
pub use runner::{run_from_config, RunError, RunResult};
pub use summary::{summarize, DirectionalBias, LatestValues, Onset, RunSummary, TrendStrength};
pub use synthetic::{synthetic_frame, DEFAULT_LABEL};
pub use verify::{verify_file, verify_frames, Mismatch, VerifyReport};
