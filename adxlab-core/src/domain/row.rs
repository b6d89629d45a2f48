//! ComputedRow — one output record per input bar.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::bar::Bar;

/// The ten derived columns, in output order.
///
/// Names are fixed (`TR14`, `+DI14`, ...) regardless of the period used, so
/// downstream consumers and reference files see a stable schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputColumn {
    #[serde(rename = "TR")]
    Tr,
    #[serde(rename = "+DM")]
    PlusDm,
    #[serde(rename = "-DM")]
    MinusDm,
    #[serde(rename = "TR14")]
    Tr14,
    #[serde(rename = "+DM14")]
    PlusDm14,
    #[serde(rename = "-DM14")]
    MinusDm14,
    #[serde(rename = "+DI14")]
    PlusDi14,
    #[serde(rename = "-DI14")]
    MinusDi14,
    #[serde(rename = "DX")]
    Dx,
    #[serde(rename = "ADX")]
    Adx,
}

impl OutputColumn {
    pub const ALL: [OutputColumn; 10] = [
        OutputColumn::Tr,
        OutputColumn::PlusDm,
        OutputColumn::MinusDm,
        OutputColumn::Tr14,
        OutputColumn::PlusDm14,
        OutputColumn::MinusDm14,
        OutputColumn::PlusDi14,
        OutputColumn::MinusDi14,
        OutputColumn::Dx,
        OutputColumn::Adx,
    ];

    /// Column name as it appears in output tables.
    pub fn name(self) -> &'static str {
        match self {
            OutputColumn::Tr => "TR",
            OutputColumn::PlusDm => "+DM",
            OutputColumn::MinusDm => "-DM",
            OutputColumn::Tr14 => "TR14",
            OutputColumn::PlusDm14 => "+DM14",
            OutputColumn::MinusDm14 => "-DM14",
            OutputColumn::PlusDi14 => "+DI14",
            OutputColumn::MinusDi14 => "-DI14",
            OutputColumn::Dx => "DX",
            OutputColumn::Adx => "ADX",
        }
    }

    /// Look up a column by its table name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for OutputColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The input bar plus every derived value at the same position.
///
/// `None` marks a cell whose recurrence has not started (or was suppressed
/// by a zero denominator). It is never coerced to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedRow {
    pub bar: Bar,
    pub tr: Option<f64>,
    pub plus_dm: Option<f64>,
    pub minus_dm: Option<f64>,
    pub tr14: Option<f64>,
    pub plus_dm14: Option<f64>,
    pub minus_dm14: Option<f64>,
    pub plus_di14: Option<f64>,
    pub minus_di14: Option<f64>,
    pub dx: Option<f64>,
    pub adx: Option<f64>,
}

impl ComputedRow {
    pub(crate) fn blank(bar: Bar) -> Self {
        Self {
            bar,
            tr: None,
            plus_dm: None,
            minus_dm: None,
            tr14: None,
            plus_dm14: None,
            minus_dm14: None,
            plus_di14: None,
            minus_di14: None,
            dx: None,
            adx: None,
        }
    }

    pub fn get(&self, column: OutputColumn) -> Option<f64> {
        match column {
            OutputColumn::Tr => self.tr,
            OutputColumn::PlusDm => self.plus_dm,
            OutputColumn::MinusDm => self.minus_dm,
            OutputColumn::Tr14 => self.tr14,
            OutputColumn::PlusDm14 => self.plus_dm14,
            OutputColumn::MinusDm14 => self.minus_dm14,
            OutputColumn::PlusDi14 => self.plus_di14,
            OutputColumn::MinusDi14 => self.minus_di14,
            OutputColumn::Dx => self.dx,
            OutputColumn::Adx => self.adx,
        }
    }
}

/// Extract one derived column from a computed sequence.
pub fn column_values(rows: &[ComputedRow], column: OutputColumn) -> Vec<Option<f64>> {
    rows.iter().map(|r| r.get(column)).collect()
}
