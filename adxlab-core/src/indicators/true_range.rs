//! True Range (stage 1).
//!
//! TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
//! TR[0] is undefined: without a previous close the gap terms do not exist,
//! and the first bar's plain high-low range is not substituted.

use crate::domain::Bar;

/// True Range of `bar` given the previous close.
#[inline]
pub fn true_range_at(bar: &Bar, prev_close: f64) -> f64 {
    (bar.high - bar.low)
        .max((bar.high - prev_close).abs())
        .max((bar.low - prev_close).abs())
}

/// Compute the True Range series. Same length as `bars`; index 0 is `None`.
pub fn true_range(bars: &[Bar]) -> Vec<Option<f64>> {
    let mut tr = Vec::with_capacity(bars.len());
    if bars.is_empty() {
        return tr;
    }

    tr.push(None);
    tr.extend(
        bars.windows(2)
            .map(|w| Some(true_range_at(&w[1], w[0].close))),
    );
    tr
}
