//! ADX Lab Core — directional movement engine, domain types, table adapter.
//!
//! This crate contains the computation and its input/output contract:
//! - Domain types (bars, computed rows, output column names)
//! - The four-stage ADX engine (TR, ±DM, anchored Wilder sums, DI/DX/ADX)
//! - Schema validation of High/Low/Close (case-insensitive, numeric)
//! - A polars adapter that passes input columns through and appends the results
//! - CSV/Parquet ingestion into a DataFrame
//!
//! The engine is a pure function of its input. Nothing here holds state
//! between calls.

pub mod data;
pub mod domain;
pub mod indicators;

pub use data::{
    compute_frame, compute_table, ComputedTable, DataError, DataIngestor, FrameError, SchemaError,
};
pub use domain::{Bar, ComputedRow, OutputColumn};
pub use indicators::{DirectionalEngine, DEFAULT_PERIOD};

/// Compute every derived column for `bars` with the given Wilder period.
///
/// # Panics
/// If `period` is zero.
pub fn compute(bars: &[Bar], period: usize) -> Vec<ComputedRow> {
    DirectionalEngine::new(period).compute(bars)
}
