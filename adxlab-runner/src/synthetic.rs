//! Deterministic synthetic price tables for demos and benchmarks.
//!
//! A simple random walk from a starting price of 100.0, seeded from a label
//! so the same label always yields the same table.

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use adxlab_core::Bar;

/// Label used when the caller does not pick one.
pub const DEFAULT_LABEL: &str = "adxlab";

/// One synthetic trading day.
#[derive(Debug, Clone, PartialEq)]
pub struct DatedBar {
    pub date: NaiveDate,
    pub bar: Bar,
}

/// Generate `count` weekday bars starting on or after `start`.
pub fn synthetic_bars(label: &str, start: NaiveDate, count: usize) -> Vec<DatedBar> {
    let seed: [u8; 32] = *blake3::hash(label.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::with_capacity(count);
    let mut price = 100.0_f64;
    let mut current = start;

    while bars.len() < count {
        let weekday = current.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64);

        bars.push(DatedBar {
            date: current,
            bar: Bar::new(high, low, close)
                .with_open(open)
                .with_volume(volume as f64),
        });

        price = close;
        current += chrono::Duration::days(1);
    }

    bars
}

/// Synthetic bars as a `Date, Open, High, Low, Close, Volume` table.
///
/// Dates are ISO `YYYY-MM-DD` strings so the table round-trips through CSV
/// unchanged.
pub fn synthetic_frame(label: &str, start: NaiveDate, count: usize) -> PolarsResult<DataFrame> {
    let bars = synthetic_bars(label, start, count);
    let dates: Vec<String> = bars.iter().map(|b| b.date.to_string()).collect();
    let open: Vec<Option<f64>> = bars.iter().map(|b| b.bar.open).collect();
    let high: Vec<f64> = bars.iter().map(|b| b.bar.high).collect();
    let low: Vec<f64> = bars.iter().map(|b| b.bar.low).collect();
    let close: Vec<f64> = bars.iter().map(|b| b.bar.close).collect();
    let volume: Vec<Option<i64>> = bars
        .iter()
        .map(|b| b.bar.volume.map(|v| v as i64))
        .collect();

    DataFrame::new(vec![
        Column::new("Date".into(), dates),
        Column::new("Open".into(), open),
        Column::new("High".into(), high),
        Column::new("Low".into(), low),
        Column::new("Close".into(), close),
        Column::new("Volume".into(), volume),
    ])
}
