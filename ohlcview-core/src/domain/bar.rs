//! Bar — the fundamental market data unit — and its derived columns.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Divisor applied to raw volume to produce the compact "RV" column.
pub const VOLUME_SCALE: f64 = 10_000.0;

/// Well-formed OHLCV bar: every field is present.
///
/// The only way to obtain one from provider data is
/// [`RawBar::into_bar`](crate::data::provider::RawBar::into_bar), which rejects
/// rows with any missing field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Exchange-local wall clock time at the start of the interval.
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// A bar plus the three display columns computed from it.
///
/// Fields are private so a `DerivedBar` can only come from [`DerivedBar::from_bar`]
/// and never disagrees with its source bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedBar {
    bar: Bar,
    rv: f64,
    oc: f64,
    range: f64,
}

impl DerivedBar {
    pub fn from_bar(bar: Bar) -> Self {
        Self {
            rv: bar.volume as f64 / VOLUME_SCALE,
            oc: bar.close - bar.open,
            range: bar.high - bar.low,
            bar,
        }
    }

    pub fn bar(&self) -> &Bar {
        &self.bar
    }

    /// Scaled volume: `volume / 10_000`.
    pub fn rv(&self) -> f64 {
        self.rv
    }

    /// Close minus open.
    pub fn oc(&self) -> f64 {
        self.oc
    }

    /// High minus low.
    pub fn range(&self) -> f64 {
        self.range
    }
}

impl From<Bar> for DerivedBar {
    fn from(bar: Bar) -> Self {
        Self::from_bar(bar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_bar() -> Bar {
        Bar {
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            open: 10.0,
            high: 12.0,
            low: 9.0,
            close: 11.0,
            volume: 50_000,
        }
    }

    #[test]
    fn derives_oc_range_and_rv() {
        let d = DerivedBar::from_bar(sample_bar());
        assert_eq!(d.oc(), 1.0);
        assert_eq!(d.range(), 3.0);
        assert_eq!(d.rv(), 5.0);
    }

    #[test]
    fn flat_bar_derives_zeros() {
        let mut bar = sample_bar();
        bar.open = 11.0;
        bar.high = 11.0;
        bar.low = 11.0;
        bar.close = 11.0;
        bar.volume = 0;
        let d = DerivedBar::from(bar);
        assert_eq!(d.oc(), 0.0);
        assert_eq!(d.range(), 0.0);
        assert_eq!(d.rv(), 0.0);
    }

    #[test]
    fn down_bar_has_negative_oc() {
        let mut bar = sample_bar();
        bar.close = 9.5;
        let d = DerivedBar::from_bar(bar);
        assert_eq!(d.oc(), -0.5);
        assert_eq!(d.bar().close, 9.5);
    }
}
