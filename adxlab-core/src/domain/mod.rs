//! Domain types for ADX Lab

pub mod bar;
pub mod row;

pub use bar::Bar;
pub use row::{column_values, ComputedRow, OutputColumn};
