//! Wilder smoothing, anchored at an explicit index.
//!
//! Both recurrences seed from the `period` values ending at `anchor`
//! (window `anchor + 1 - period ..= anchor`) and carry forward from there.
//! Every index before `anchor` is `None`.
//!
//! - Running sum (TR14, ±DM14): seed = window sum,
//!   `s[t] = s[t-1] - s[t-1] / period + x[t]`.
//! - Running average (ADX): seed = window mean,
//!   `a[t] = (a[t-1] * (period - 1) + x[t]) / period`.
//!
//! Undefined window cells are skipped when seeding. After the seed, an
//! undefined input or predecessor makes the output undefined from there on.

/// First index of the seed window ending at `anchor`.
#[inline]
fn window_start(period: usize, anchor: usize) -> usize {
    debug_assert!(period >= 1, "Wilder period must be >= 1");
    debug_assert!(anchor + 1 >= period, "anchor {anchor} precedes a full window");
    anchor + 1 - period
}

/// Wilder running sum with smoothing factor `1/period`.
pub fn wilder_sum(values: &[Option<f64>], period: usize, anchor: usize) -> Vec<Option<f64>> {
    smooth(
        values,
        window_start(period, anchor),
        anchor,
        |window| Some(window.iter().flatten().sum()),
        |prev, x| prev - prev / period as f64 + x,
    )
}

/// Wilder running average with smoothing factor `1/period`.
///
/// The seed is `None` when every cell of the window is undefined.
pub fn wilder_average(values: &[Option<f64>], period: usize, anchor: usize) -> Vec<Option<f64>> {
    smooth(
        values,
        window_start(period, anchor),
        anchor,
        |window| {
            let defined: Vec<f64> = window.iter().flatten().copied().collect();
            if defined.is_empty() {
                None
            } else {
                Some(defined.iter().sum::<f64>() / defined.len() as f64)
            }
        },
        |prev, x| (prev * (period - 1) as f64 + x) / period as f64,
    )
}

fn smooth(
    values: &[Option<f64>],
    start: usize,
    anchor: usize,
    seed: impl Fn(&[Option<f64>]) -> Option<f64>,
    step: impl Fn(f64, f64) -> f64,
) -> Vec<Option<f64>> {
    let n = values.len();
    let mut result = vec![None; n];

    if n <= anchor {
        return result;
    }

    result[anchor] = seed(&values[start..=anchor]);

    for i in anchor + 1..n {
        result[i] = match (result[i - 1], values[i]) {
            (Some(prev), Some(x)) => Some(step(prev, x)),
            _ => None,
        };
    }

    result
}
