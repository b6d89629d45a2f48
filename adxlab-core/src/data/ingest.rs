use polars::prelude::*;
use std::path::Path;
use tracing::debug;

/// Rows used for CSV schema inference.
const INFER_SCHEMA_ROWS: usize = 1000;

/// Data ingestor for CSV and Parquet price tables.
///
/// Column names and order are preserved exactly as found in the file; the
/// High/Low/Close check happens later, in the engine's schema validation.
#[derive(Debug, Clone)]
pub struct DataIngestor {
    infer_schema_rows: usize,
}

impl DataIngestor {
    pub fn new() -> Self {
        Self {
            infer_schema_rows: INFER_SCHEMA_ROWS,
        }
    }

    /// Ingest a file, choosing the reader by extension.
    ///
    /// `.parquet` is read as Parquet; anything else (`.csv`, `.txt`, no
    /// extension) is read as CSV with a header row. A table with no rows is
    /// returned as is.
    pub fn ingest_path(&self, path: &Path) -> Result<DataFrame, DataError> {
        let format = FileFormat::from_path(path);
        debug!(path = %path.display(), ?format, "ingesting price table");
        match format {
            FileFormat::Parquet => self.ingest_parquet(path),
            FileFormat::Csv => self.ingest_csv(path),
        }
    }

    /// Ingest CSV file
    pub fn ingest_csv(&self, path: &Path) -> Result<DataFrame, DataError> {
        LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_rows))
            .finish()
            .and_then(|lf| lf.collect())
            .map_err(|e| DataError::IngestFailed(format!("{}: {e}", path.display())))
    }

    /// Ingest Parquet file
    pub fn ingest_parquet(&self, path: &Path) -> Result<DataFrame, DataError> {
        LazyFrame::scan_parquet(path, Default::default())
            .and_then(|lf| lf.collect())
            .map_err(|e| DataError::IngestFailed(format!("{}: {e}", path.display())))
    }
}

impl Default for DataIngestor {
    fn default() -> Self {
        Self::new()
    }
}

/// On-disk table formats understood by the ingestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Parquet,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("parquet") | Some("pq") => FileFormat::Parquet,
            _ => FileFormat::Csv,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Ingest failed: {0}")]
    IngestFailed(String),
}
