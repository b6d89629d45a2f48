//! DataFrame adapter for the directional engine.
//!
//! Input columns are passed through untouched, in their original order. The
//! ten derived columns are appended as nullable `Float64`; undefined cells
//! are nulls. A derived column whose name already exists in the input is
//! replaced.

use polars::prelude::*;
use tracing::{debug, warn};

use crate::data::schema::{numeric_column, required_numeric_column, PriceColumns, SchemaError};
use crate::domain::{column_values, Bar, ComputedRow, OutputColumn};
use crate::indicators::DirectionalEngine;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Failed to assemble output table: {0}")]
    Polars(#[from] PolarsError),
}

/// Extract typed bars from a table.
///
/// High/Low/Close must be present and fully numeric. Open and Volume are
/// read when present and numeric; otherwise they are left empty.
pub fn bars_from_frame(df: &DataFrame) -> Result<Vec<Bar>, SchemaError> {
    let cols = PriceColumns::from_frame(df)?;
    let high = required_numeric_column(df, &cols.high)?;
    let low = required_numeric_column(df, &cols.low)?;
    let close = required_numeric_column(df, &cols.close)?;
    let open = optional_numeric(df, cols.open.as_deref());
    let volume = optional_numeric(df, cols.volume.as_deref());

    let bars = (0..df.height())
        .map(|i| Bar {
            open: open.as_ref().and_then(|v| v[i]),
            high: high[i],
            low: low[i],
            close: close[i],
            volume: volume.as_ref().and_then(|v| v[i]),
        })
        .collect();
    Ok(bars)
}

/// Pass-through columns are never a reason to fail.
fn optional_numeric(df: &DataFrame, name: Option<&str>) -> Option<Vec<Option<f64>>> {
    numeric_column(df, name?).ok()
}

/// Output table together with the typed rows it was built from.
#[derive(Debug, Clone)]
pub struct ComputedTable {
    pub frame: DataFrame,
    pub rows: Vec<ComputedRow>,
}

/// Compute every derived column for a table of bars.
///
/// Fails only when High/Low/Close are missing or not numeric; no row is
/// produced in that case.
pub fn compute_frame(df: &DataFrame, period: usize) -> Result<DataFrame, FrameError> {
    compute_table(df, period).map(|table| table.frame)
}

/// Like [`compute_frame`], but keeps the computed rows as well.
pub fn compute_table(df: &DataFrame, period: usize) -> Result<ComputedTable, FrameError> {
    let engine = DirectionalEngine::new(period);
    let bars = bars_from_frame(df)?;

    let insane = bars.iter().filter(|b| !b.is_sane()).count();
    if insane > 0 {
        warn!(insane, "bars with close or open outside the high-low range");
    }

    let rows = engine.compute(&bars);
    let frame = append_output(df, &rows)?;
    debug!(rows = frame.height(), columns = frame.width(), "assembled output table");
    Ok(ComputedTable { frame, rows })
}

/// Append the derived columns of `rows` to a copy of `df`.
pub fn append_output(df: &DataFrame, rows: &[ComputedRow]) -> PolarsResult<DataFrame> {
    let mut out = df.clone();
    for column in output_columns(rows) {
        out.with_column(column)?;
    }
    Ok(out)
}

/// The ten derived columns as polars columns, in output order.
pub fn output_columns(rows: &[ComputedRow]) -> Vec<Column> {
    OutputColumn::ALL
        .iter()
        .map(|&col| Column::from(Series::new(col.name().into(), column_values(rows, col))))
        .collect()
}

/// Build a plain High/Low/Close table from bars (Open/Volume when every bar has them).
pub fn frame_from_bars(bars: &[Bar]) -> PolarsResult<DataFrame> {
    let mut columns = Vec::with_capacity(5);
    if bars.iter().all(|b| b.open.is_some()) {
        let open: Vec<Option<f64>> = bars.iter().map(|b| b.open).collect();
        columns.push(Column::new("Open".into(), open));
    }
    columns.push(Column::new(
        "High".into(),
        bars.iter().map(|b| b.high).collect::<Vec<f64>>(),
    ));
    columns.push(Column::new(
        "Low".into(),
        bars.iter().map(|b| b.low).collect::<Vec<f64>>(),
    ));
    columns.push(Column::new(
        "Close".into(),
        bars.iter().map(|b| b.close).collect::<Vec<f64>>(),
    ));
    if bars.iter().all(|b| b.volume.is_some()) {
        let volume: Vec<Option<f64>> = bars.iter().map(|b| b.volume).collect();
        columns.push(Column::new("Volume".into(), volume));
    }
    DataFrame::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uptrend(n: usize) -> DataFrame {
        let high: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        let low: Vec<f64> = (0..n).map(|i| 99.0 + i as f64).collect();
        let close: Vec<f64> = (0..n).map(|i| 99.5 + i as f64).collect();
        let date: Vec<String> = (0..n).map(|i| format!("day-{i}")).collect();
        DataFrame::new(vec![
            Column::new("date".into(), date),
            Column::new("HIGH".into(), high),
            Column::new("Low".into(), low),
            Column::new("close".into(), close),
            Column::new("Signal".into(), vec![1i32; n]),
        ])
        .unwrap()
    }

    #[test]
    fn output_keeps_input_columns_and_appends_derived() {
        let df = uptrend(30);
        let out = compute_frame(&df, 14).unwrap();

        let names: Vec<String> = out
            .get_column_names()
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(&names[..5], ["date", "HIGH", "Low", "close", "Signal"]);
        let derived: Vec<&str> = OutputColumn::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(&names[5..], derived.as_slice());
        assert_eq!(out.height(), 30);

        // Pass-through column untouched
        let signal = out.column("Signal").unwrap().as_materialized_series();
        assert!(signal.equals(df.column("Signal").unwrap().as_materialized_series()));
    }

    #[test]
    fn undefined_cells_are_nulls() {
        let out = compute_frame(&uptrend(30), 14).unwrap();
        assert_eq!(out.column("TR").unwrap().null_count(), 1);
        assert_eq!(out.column("TR14").unwrap().null_count(), 14);
        assert_eq!(out.column("ADX").unwrap().null_count(), 27);
        assert_eq!(out.column("+DM").unwrap().null_count(), 0);
    }

    #[test]
    fn missing_close_is_schema_error() {
        let df = uptrend(30).drop("close").unwrap();
        let result = compute_frame(&df, 14);
        assert!(matches!(
            result,
            Err(FrameError::Schema(SchemaError::MissingColumn(ref c))) if c == "close"
        ));
    }

    #[test]
    fn text_price_column_is_schema_error() {
        let mut df = uptrend(3);
        df.with_column(Column::new("Low".into(), &["1", "2", "x"]))
            .unwrap();
        let result = compute_frame(&df, 14);
        assert!(matches!(
            result,
            Err(FrameError::Schema(SchemaError::NotNumeric { .. }))
        ));
    }

    #[test]
    fn existing_derived_column_is_replaced() {
        let mut df = uptrend(20);
        df.with_column(Column::new("ADX".into(), vec![0.0f64; 20]))
            .unwrap();
        let out = compute_frame(&df, 14).unwrap();
        assert_eq!(out.width(), df.width() + 9);
        assert_eq!(out.column("ADX").unwrap().null_count(), 20);
    }

    #[test]
    fn table_rows_match_frame_height() {
        let table = compute_table(&uptrend(30), 14).unwrap();
        assert_eq!(table.rows.len(), table.frame.height());
        assert_eq!(table.rows[27].adx, Some(100.0));
    }

    #[test]
    fn duplicate_headers_use_the_last_match() {
        let df = DataFrame::new(vec![
            Column::new("high".into(), &[10.0, 10.0]),
            Column::new("HIGH".into(), &[20.0, 25.0]),
            Column::new("Low".into(), &[1.0, 1.0]),
            Column::new("Close".into(), &[5.0, 5.0]),
        ])
        .unwrap();
        let table = compute_table(&df, 14).unwrap();
        // max(25 - 1, |25 - 5|, |1 - 5|)
        assert_eq!(table.rows[1].tr, Some(24.0));
    }

    #[test]
    fn empty_table_yields_empty_output() {
        let df = DataFrame::new(vec![
            Column::new("High".into(), Vec::<f64>::new()),
            Column::new("Low".into(), Vec::<f64>::new()),
            Column::new("Close".into(), Vec::<f64>::new()),
        ])
        .unwrap();
        let table = compute_table(&df, 14).unwrap();
        assert!(table.rows.is_empty());
        assert_eq!(table.frame.height(), 0);
        assert_eq!(table.frame.width(), 3 + OutputColumn::ALL.len());
    }

    #[test]
    fn bars_round_trip_through_frame() {
        let bars = vec![
            Bar::new(2.0, 1.0, 1.5).with_open(1.2).with_volume(10.0),
            Bar::new(3.0, 2.0, 2.5).with_open(2.2).with_volume(20.0),
        ];
        let df = frame_from_bars(&bars).unwrap();
        assert_eq!(bars_from_frame(&df).unwrap(), bars);
    }

    #[test]
    fn non_numeric_volume_is_ignored() {
        let mut df = uptrend(3);
        df.with_column(Column::new("Volume".into(), &["1k", "2k", "3k"]))
            .unwrap();
        let bars = bars_from_frame(&df).unwrap();
        assert!(bars.iter().all(|b| b.volume.is_none()));
    }
}
