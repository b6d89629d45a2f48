//! ADX — Average Directional Index, reference-anchored Wilder formulation.
//!
//! Steps:
//! 1. True Range per bar (undefined at index 0)
//! 2. +DM and -DM per bar (zero at index 0, strict tie-break)
//! 3. TR14, +DM14, -DM14: Wilder running sums seeded at index `period`
//!    with the sum of raw values at indices `1..=period`
//! 4. +DI14 = 100 * +DM14 / TR14, -DI14 = 100 * -DM14 / TR14 (undefined when TR14 is 0)
//! 5. DX = 100 * |+DI14 - -DI14| / (+DI14 + -DI14) (undefined when the sum is 0)
//! 6. ADX: mean of DX at `period..=2*period-1`, placed at index `2*period-1`,
//!    then `(ADX[t-1] * (period-1) + DX[t]) / period`
//!
//! The smoothing anchor sits at index `period`, not `period - 1`. This
//! offset reproduces a spreadsheet reference row for row and must not be
//! renormalized to the more common zero-based window.

use tracing::debug;

use crate::domain::{Bar, ComputedRow};
use crate::indicators::directional::directional_movement;
use crate::indicators::true_range::true_range;
use crate::indicators::wilder::{wilder_average, wilder_sum};

/// Default Wilder period.
pub const DEFAULT_PERIOD: usize = 14;

/// Stateless ADX engine for one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionalEngine {
    period: usize,
}

impl DirectionalEngine {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// First index at which TR14, +DM14 and -DM14 are defined.
    pub fn smoothing_onset(&self) -> usize {
        self.period
    }

    /// First index at which ADX is defined.
    pub fn adx_onset(&self) -> usize {
        2 * self.period - 1
    }

    /// Compute every derived column for `bars`.
    ///
    /// Always returns one row per bar. With `bars.len() <= period` the
    /// smoothed and oscillator columns stay undefined; that is a valid result.
    pub fn compute(&self, bars: &[Bar]) -> Vec<ComputedRow> {
        let n = bars.len();
        let period = self.period;

        let tr = true_range(bars);
        let (plus_dm, minus_dm) = directional_movement(bars);

        let anchor = self.smoothing_onset();
        let tr14 = wilder_sum(&tr, period, anchor);
        let plus_dm14 = wilder_sum(&defined(&plus_dm), period, anchor);
        let minus_dm14 = wilder_sum(&defined(&minus_dm), period, anchor);

        let mut plus_di14 = vec![None; n];
        let mut minus_di14 = vec![None; n];
        let mut dx = vec![None; n];
        for i in 0..n {
            plus_di14[i] = directional_indicator(plus_dm14[i], tr14[i]);
            minus_di14[i] = directional_indicator(minus_dm14[i], tr14[i]);
            dx[i] = directional_index(plus_di14[i], minus_di14[i]);
        }

        // Seed window is DX[period..=2*period-1], i.e. it starts where TR14 does.
        let adx = wilder_average(&dx, period, self.adx_onset());

        debug!(
            bars = n,
            period,
            smoothing_onset = anchor,
            adx_onset = self.adx_onset(),
            "computed directional movement rows"
        );

        bars.iter()
            .enumerate()
            .map(|(i, bar)| {
                let mut row = ComputedRow::blank(*bar);
                row.tr = tr[i];
                row.plus_dm = Some(plus_dm[i]);
                row.minus_dm = Some(minus_dm[i]);
                row.tr14 = tr14[i];
                row.plus_dm14 = plus_dm14[i];
                row.minus_dm14 = minus_dm14[i];
                row.plus_di14 = plus_di14[i];
                row.minus_di14 = minus_di14[i];
                row.dx = dx[i];
                row.adx = adx[i];
                row
            })
            .collect()
    }
}

impl Default for DirectionalEngine {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD)
    }
}

/// `100 * dm14 / tr14`; undefined when either side is undefined or `tr14` is zero.
pub fn directional_indicator(dm14: Option<f64>, tr14: Option<f64>) -> Option<f64> {
    match (dm14, tr14) {
        (Some(dm), Some(tr)) if tr != 0.0 => Some(100.0 * (dm / tr)),
        _ => None,
    }
}

/// `100 * |+DI - -DI| / (+DI + -DI)`; undefined when the sum is undefined or zero.
pub fn directional_index(plus_di: Option<f64>, minus_di: Option<f64>) -> Option<f64> {
    let (plus, minus) = (plus_di?, minus_di?);
    let sum = plus + minus;
    if sum == 0.0 {
        return None;
    }
    Some(100.0 * ((plus - minus).abs() / sum))
}

fn defined(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().copied().map(Some).collect()
}
