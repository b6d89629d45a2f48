//! Run summary: indicator onsets, latest values and a coarse trend reading.

use std::fmt;

use adxlab_core::ComputedRow;
use serde::{Deserialize, Serialize};

/// First row at which each smoothed series becomes defined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Onset {
    pub tr14: Option<usize>,
    pub adx: Option<usize>,
}

impl Onset {
    pub fn from_rows(rows: &[ComputedRow]) -> Self {
        Self {
            tr14: rows.iter().position(|r| r.tr14.is_some()),
            adx: rows.iter().position(|r| r.adx.is_some()),
        }
    }
}

/// Most recent defined value of each headline series.
///
/// Each field is the last *defined* value in its column, which is not
/// necessarily the last row. `index` is the row of the latest ADX.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatestValues {
    pub index: Option<usize>,
    pub adx: Option<f64>,
    pub plus_di14: Option<f64>,
    pub minus_di14: Option<f64>,
}

impl LatestValues {
    pub fn from_rows(rows: &[ComputedRow]) -> Self {
        let index = rows.iter().rposition(|r| r.adx.is_some());
        Self {
            index,
            adx: index.and_then(|i| rows[i].adx),
            plus_di14: rows.iter().rev().find_map(|r| r.plus_di14),
            minus_di14: rows.iter().rev().find_map(|r| r.minus_di14),
        }
    }
}

/// Conventional ADX strength bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStrength {
    /// ADX < 20
    Absent,
    /// 20 <= ADX < 40
    Developing,
    /// 40 <= ADX < 60
    Strong,
    /// ADX >= 60
    VeryStrong,
}

impl TrendStrength {
    pub fn classify(adx: f64) -> Self {
        if adx < 20.0 {
            TrendStrength::Absent
        } else if adx < 40.0 {
            TrendStrength::Developing
        } else if adx < 60.0 {
            TrendStrength::Strong
        } else {
            TrendStrength::VeryStrong
        }
    }
}

impl fmt::Display for TrendStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrendStrength::Absent => "absent or weak",
            TrendStrength::Developing => "developing",
            TrendStrength::Strong => "strong",
            TrendStrength::VeryStrong => "very strong",
        };
        f.write_str(label)
    }
}

/// Which directional indicator dominates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionalBias {
    Bullish,
    Bearish,
    Neutral,
}

impl DirectionalBias {
    pub fn from_di(plus_di: f64, minus_di: f64) -> Self {
        if plus_di > minus_di {
            DirectionalBias::Bullish
        } else if plus_di < minus_di {
            DirectionalBias::Bearish
        } else {
            DirectionalBias::Neutral
        }
    }
}

impl fmt::Display for DirectionalBias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DirectionalBias::Bullish => "bullish (+DI14 > -DI14)",
            DirectionalBias::Bearish => "bearish (-DI14 > +DI14)",
            DirectionalBias::Neutral => "neutral",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub onset: Onset,
    pub latest: LatestValues,
    pub strength: Option<TrendStrength>,
    pub bias: Option<DirectionalBias>,
}

pub fn summarize(rows: &[ComputedRow]) -> RunSummary {
    let latest = LatestValues::from_rows(rows);
    let bias = match (latest.plus_di14, latest.minus_di14) {
        (Some(plus), Some(minus)) => Some(DirectionalBias::from_di(plus, minus)),
        _ => None,
    };
    RunSummary {
        onset: Onset::from_rows(rows),
        latest,
        strength: latest.adx.map(TrendStrength::classify),
        bias,
    }
}
