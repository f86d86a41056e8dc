//! Bar interval — the sampling granularity requested from the provider.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Supported bar intervals. Wire strings match the provider's `interval` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "2m")]
    M2,
    #[serde(rename = "5m")]
    M5,
    #[default]
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "60m")]
    M60,
    #[serde(rename = "1d")]
    D1,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown interval '{0}' (expected one of 2m, 5m, 15m, 30m, 60m, 1d)")]
pub struct UnknownInterval(pub String);

impl Interval {
    /// All intervals in selector order.
    pub const ALL: [Interval; 6] = [
        Interval::M2,
        Interval::M5,
        Interval::M15,
        Interval::M30,
        Interval::M60,
        Interval::D1,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Interval::M2 => "2m",
            Interval::M5 => "5m",
            Interval::M15 => "15m",
            Interval::M30 => "30m",
            Interval::M60 => "60m",
            Interval::D1 => "1d",
        }
    }

    pub fn is_intraday(self) -> bool {
        self != Interval::D1
    }

    /// How far back Yahoo serves bars at this granularity, in days.
    /// `None` means unlimited.
    pub fn max_lookback_days(self) -> Option<i64> {
        match self {
            Interval::M2 | Interval::M5 | Interval::M15 | Interval::M30 => Some(60),
            Interval::M60 => Some(730),
            Interval::D1 => None,
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|i| *i == self).unwrap_or(0)
    }

    /// Next interval in selector order, wrapping around.
    pub fn next(self) -> Interval {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous interval in selector order, wrapping around.
    pub fn prev(self) -> Interval {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = UnknownInterval;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Interval::ALL
            .iter()
            .copied()
            .find(|i| i.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownInterval(s.to_string()))
    }
}
