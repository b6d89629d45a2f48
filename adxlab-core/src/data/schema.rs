use polars::prelude::*;

/// Required price columns, resolved against a table's actual headers.
///
/// Lookup is case-insensitive but otherwise exact: `High` and `HIGH` match,
/// ` High ` does not. When several headers match, the last one wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceColumns {
    pub high: String,
    pub low: String,
    pub close: String,
    pub open: Option<String>,
    pub volume: Option<String>,
}

impl PriceColumns {
    pub const REQUIRED: [&'static str; 3] = ["high", "low", "close"];

    /// Resolve column names from a header list.
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Result<Self, SchemaError> {
        let find = |wanted: &str| {
            headers
                .iter()
                .map(AsRef::as_ref)
                .rev()
                .find(|h| h.eq_ignore_ascii_case(wanted))
                .map(str::to_string)
        };
        let require = |wanted: &str| {
            find(wanted).ok_or_else(|| SchemaError::MissingColumn(wanted.to_string()))
        };

        Ok(Self {
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            open: find("open"),
            volume: find("volume"),
        })
    }

    /// Resolve column names from a DataFrame's schema.
    pub fn from_frame(df: &DataFrame) -> Result<Self, SchemaError> {
        let headers: Vec<&str> = df.get_column_names().into_iter().map(|n| n.as_str()).collect();
        Self::resolve(&headers)
    }
}

/// Read a column as `Float64`, failing if any non-null cell does not coerce.
///
/// Integer and string columns are accepted when every value parses.
pub fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, SchemaError> {
    let column = df
        .column(name)
        .map_err(|_| SchemaError::MissingColumn(name.to_string()))?;
    let series = column
        .as_materialized_series()
        .strict_cast(&DataType::Float64)
        .map_err(|e| SchemaError::NotNumeric {
            column: name.to_string(),
            reason: e.to_string(),
        })?;
    let values = series.f64().map_err(|e| SchemaError::NotNumeric {
        column: name.to_string(),
        reason: e.to_string(),
    })?;
    Ok(values.into_iter().collect())
}

/// Like [`numeric_column`], but a null cell is an error.
pub fn required_numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>, SchemaError> {
    numeric_column(df, name)?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| SchemaError::NullValue {
                column: name.to_string(),
                row,
            })
        })
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Input must contain columns High, Low, Close (missing: {0})")]
    MissingColumn(String),

    #[error("Column {column} is not numeric: {reason}")]
    NotNumeric { column: String, reason: String },

    #[error("Column {column} has an empty value at row {row}")]
    NullValue { column: String, row: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(columns: Vec<Column>) -> DataFrame {
        DataFrame::new(columns).unwrap()
    }

    #[test]
    fn resolve_is_case_insensitive() {
        let cols = PriceColumns::resolve(&["Date", "OPEN", "High", "low", "CLOSE"]).unwrap();
        assert_eq!(cols.high, "High");
        assert_eq!(cols.low, "low");
        assert_eq!(cols.close, "CLOSE");
        assert_eq!(cols.open.as_deref(), Some("OPEN"));
        assert!(cols.volume.is_none());
    }

    #[test]
    fn resolve_rejects_missing_column() {
        let result = PriceColumns::resolve(&["Date", "High", "Close"]);
        assert!(matches!(result, Err(SchemaError::MissingColumn(c)) if c == "low"));
    }

    #[test]
    fn resolve_last_match_wins() {
        let cols = PriceColumns::resolve(&["high", "HIGH", "low", "close", "Low"]).unwrap();
        assert_eq!(cols.high, "HIGH");
        assert_eq!(cols.low, "Low");
    }

    #[test]
    fn resolve_does_not_trim_headers() {
        let result = PriceColumns::resolve(&["High", "Low", " Close "]);
        assert!(matches!(result, Err(SchemaError::MissingColumn(c)) if c == "close"));
    }

    #[test]
    fn numeric_column_accepts_integers() {
        let df = frame(vec![Column::new("High".into(), &[1i64, 2, 3])]);
        let values = numeric_column(&df, "High").unwrap();
        assert_eq!(values, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn numeric_column_parses_numeric_strings() {
        let df = frame(vec![Column::new("Close".into(), &["1.5", "2.25"])]);
        let values = numeric_column(&df, "Close").unwrap();
        assert_eq!(values, vec![Some(1.5), Some(2.25)]);
    }

    #[test]
    fn numeric_column_rejects_text() {
        let df = frame(vec![Column::new("Close".into(), &["1.5", "n/a"])]);
        let result = numeric_column(&df, "Close");
        assert!(matches!(result, Err(SchemaError::NotNumeric { .. })));
    }

    #[test]
    fn required_column_rejects_null() {
        let df = frame(vec![Column::new("Low".into(), &[Some(1.0), None])]);
        let result = required_numeric_column(&df, "Low");
        assert!(matches!(
            result,
            Err(SchemaError::NullValue { ref column, row: 1 }) if column == "Low"
        ));
    }
}
