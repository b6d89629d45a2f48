//! Bar — one OHLC input record.

use serde::{Deserialize, Serialize};

/// OHLC bar at a single position of the series.
///
/// Only `high`, `low` and `close` feed the computation. `open` and `volume`
/// ride along so typed callers can carry them; table callers keep every
/// column (dates included) through the frame adapter instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub open: Option<f64>,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

impl Bar {
    pub fn new(high: f64, low: f64, close: f64) -> Self {
        Self {
            open: None,
            high,
            low,
            close,
            volume: None,
        }
    }

    pub fn with_open(mut self, open: f64) -> Self {
        self.open = Some(open);
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Returns true if any of high/low/close is NaN.
    pub fn is_void(&self) -> bool {
        self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: low <= close <= high, and the same for open when present.
    ///
    /// Insane bars are still computed; callers use this for diagnostics only.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        let within = |v: f64| v >= self.low && v <= self.high;
        self.high >= self.low && within(self.close) && self.open.map_or(true, within)
    }
}
