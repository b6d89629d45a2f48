//! Directional movement indicators.
//!
//! The computation runs in four stages, each a separate module:
//! raw True Range, raw directional movement, anchored Wilder smoothing,
//! then DI/DX/ADX in `adx`. Only `DirectionalEngine` ties them together.

pub mod adx;
pub mod directional;
pub mod true_range;
pub mod wilder;

pub use adx::{directional_index, directional_indicator, DirectionalEngine, DEFAULT_PERIOD};
pub use directional::{directional_movement, split_movement};
pub use true_range::{true_range, true_range_at};
pub use wilder::{wilder_average, wilder_sum};

/// Build bars from (open, high, low, close) tuples for testing.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    data.iter()
        .map(|&(open, high, low, close)| {
            Bar::new(high, low, close)
                .with_open(open)
                .with_volume(1000.0)
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Assert an optional value is defined and approximately equal to `expected`.
#[cfg(test)]
pub fn assert_defined_approx(actual: Option<f64>, expected: f64, epsilon: f64) {
    match actual {
        Some(v) => assert_approx(v, expected, epsilon),
        None => panic!("expected {expected}, got undefined"),
    }
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
