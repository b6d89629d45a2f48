//! Table ingestion, schema validation and the DataFrame adapter

pub mod frame;
pub mod ingest;
pub mod schema;

pub use frame::{
    append_output, bars_from_frame, compute_frame, compute_table, frame_from_bars, ComputedTable,
    FrameError,
};
pub use ingest::{DataError, DataIngestor, FileFormat};
pub use schema::{PriceColumns, SchemaError};
