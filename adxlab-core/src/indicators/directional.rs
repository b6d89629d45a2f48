//! Raw directional movement (stage 2).
//!
//! up = high[t] - high[t-1], down = low[t-1] - low[t].
//! +DM = up when up > down and up > 0, else 0.
//! -DM = down when down > up and down > 0, else 0.
//!
//! Both comparisons are strict, so a bar with up == down yields zero on
//! both sides. Bar 0 has no predecessor and is zero on both sides.

use crate::domain::Bar;

/// Split a bar-to-bar excursion into (+DM, -DM).
#[inline]
pub fn split_movement(up_move: f64, down_move: f64) -> (f64, f64) {
    let plus = if up_move > down_move && up_move > 0.0 {
        up_move
    } else {
        0.0
    };
    let minus = if down_move > up_move && down_move > 0.0 {
        down_move
    } else {
        0.0
    };
    (plus, minus)
}

/// Compute the (+DM, -DM) series. Both have the same length as `bars`.
pub fn directional_movement(bars: &[Bar]) -> (Vec<f64>, Vec<f64>) {
    let n = bars.len();
    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];

    for i in 1..n {
        let up_move = bars[i].high - bars[i - 1].high;
        let down_move = bars[i - 1].low - bars[i].low;
        let (plus, minus) = split_movement(up_move, down_move);
        plus_dm[i] = plus;
        minus_dm[i] = minus;
    }

    (plus_dm, minus_dm)
}
