//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Shape — one output row per input bar, input bars carried through
//! 2. Onset — TR, smoothed sums and ADX undefined before their anchor rows
//! 3. Monotone onset — once defined, TR14 and ADX stay defined
//! 4. Anchor — TR14[period] is the sum of TR over 1..=period
//! 5. Bounds — DX and ADX within [0, 100] when defined
//! 6. No look-ahead — truncating the series does not change earlier rows

use adxlab_core::{Bar, DirectionalEngine};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

/// Random-walk bars with valid OHLC geometry.
fn arb_bars(max_len: usize) -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::vec((-2.0..2.0_f64, 0.0..1.5_f64, 0.0..1.5_f64, 0.0..1.0_f64), 0..max_len)
        .prop_map(|steps| {
            let mut price = 100.0;
            steps
                .into_iter()
                .map(|(step, up, down, frac)| {
                    price = (price + step).max(1.0);
                    let high = price + up;
                    let low = price - down;
                    let close = low + (high - low) * frac;
                    Bar::new(high, low, close)
                })
                .collect()
        })
}

fn arb_period() -> impl Strategy<Value = usize> {
    1usize..20
}

// ── 1–2. Shape and onset ─────────────────────────────────────────────

proptest! {
    #[test]
    fn output_length_matches_input(bars in arb_bars(80), period in arb_period()) {
        let rows = DirectionalEngine::new(period).compute(&bars);
        prop_assert_eq!(rows.len(), bars.len());
        for (row, bar) in rows.iter().zip(&bars) {
            prop_assert_eq!(&row.bar, bar);
        }
    }

    #[test]
    fn nothing_defined_before_anchor_rows(bars in arb_bars(80), period in arb_period()) {
        let engine = DirectionalEngine::new(period);
        let rows = engine.compute(&bars);

        if let Some(first) = rows.first() {
            prop_assert!(first.tr.is_none());
            prop_assert_eq!(first.plus_dm, Some(0.0));
            prop_assert_eq!(first.minus_dm, Some(0.0));
        }
        for row in rows.iter().take(engine.smoothing_onset()) {
            prop_assert!(row.tr14.is_none());
            prop_assert!(row.plus_dm14.is_none());
            prop_assert!(row.minus_dm14.is_none());
        }
        for row in rows.iter().take(engine.adx_onset()) {
            prop_assert!(row.adx.is_none());
        }
    }

    #[test]
    fn smoothed_sums_defined_from_anchor(bars in arb_bars(80), period in arb_period()) {
        let engine = DirectionalEngine::new(period);
        let rows = engine.compute(&bars);
        for row in rows.iter().skip(engine.smoothing_onset()) {
            prop_assert!(row.tr14.is_some());
            prop_assert!(row.plus_dm14.is_some());
            prop_assert!(row.minus_dm14.is_some());
        }
    }
}

// ── 3. Monotone onset ────────────────────────────────────────────────

proptest! {
    #[test]
    fn tr14_onset_is_monotone(bars in arb_bars(80), period in arb_period()) {
        let rows = DirectionalEngine::new(period).compute(&bars);
        if let Some(k) = rows.iter().position(|r| r.tr14.is_some()) {
            prop_assert!(rows[k..].iter().all(|r| r.tr14.is_some()));
        }
    }

    /// With period >= 2 a positive DM14 only decays geometrically and never
    /// returns to zero, so DX cannot drop out once ADX has started.
    #[test]
    fn adx_onset_is_monotone(bars in arb_bars(80), period in 2usize..20) {
        let rows = DirectionalEngine::new(period).compute(&bars);
        if let Some(k) = rows.iter().position(|r| r.adx.is_some()) {
            prop_assert!(rows[k..].iter().all(|r| r.adx.is_some()));
        }
    }
}

// ── 4. Anchor row ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn first_smoothed_sum_is_sum_of_raw_values_one_through_period(
        bars in arb_bars(80),
        period in arb_period(),
    ) {
        prop_assume!(bars.len() > period);
        let rows = DirectionalEngine::new(period).compute(&bars);
        let tr: f64 = rows[1..=period].iter().map(|r| r.tr.unwrap()).sum();
        let plus: f64 = rows[1..=period].iter().map(|r| r.plus_dm.unwrap()).sum();
        let minus: f64 = rows[1..=period].iter().map(|r| r.minus_dm.unwrap()).sum();
        prop_assert!((rows[period].tr14.unwrap() - tr).abs() < 1e-9);
        prop_assert!((rows[period].plus_dm14.unwrap() - plus).abs() < 1e-9);
        prop_assert!((rows[period].minus_dm14.unwrap() - minus).abs() < 1e-9);
    }
}

// ── 5. Bounds ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn dx_and_adx_are_percentages(bars in arb_bars(80), period in arb_period()) {
        let rows = DirectionalEngine::new(period).compute(&bars);
        for row in &rows {
            if let Some(dx) = row.dx {
                prop_assert!((0.0..=100.0 + 1e-9).contains(&dx), "DX out of range: {}", dx);
            }
            if let Some(adx) = row.adx {
                prop_assert!((0.0..=100.0 + 1e-9).contains(&adx), "ADX out of range: {}", adx);
            }
            if let Some(di) = row.plus_di14 {
                prop_assert!(di >= 0.0);
            }
        }
    }

    #[test]
    fn raw_dm_mutually_exclusive(bars in arb_bars(80)) {
        let rows = DirectionalEngine::default().compute(&bars);
        for row in &rows {
            let (p, m) = (row.plus_dm.unwrap(), row.minus_dm.unwrap());
            prop_assert!(p >= 0.0 && m >= 0.0);
            prop_assert!(p == 0.0 || m == 0.0);
        }
    }
}

// ── 6. No look-ahead ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn truncation_does_not_change_prefix(
        bars in arb_bars(80),
        period in arb_period(),
        cut in 0usize..80,
    ) {
        let cut = cut.min(bars.len());
        let engine = DirectionalEngine::new(period);
        let full = engine.compute(&bars);
        let truncated = engine.compute(&bars[..cut]);
        prop_assert_eq!(&full[..cut], truncated.as_slice());
    }
}
