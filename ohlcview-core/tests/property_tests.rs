//! Property tests for derivation and filtering.
//!
//! Uses proptest to verify:
//! 1. Derived columns are exact functions of their source bar
//! 2. Row count equals the number of well-formed bars
//! 3. Output order follows provider order

use chrono::{Duration, NaiveDate, NaiveDateTime};
use ohlcview_core::data::{raw_bars_to_frame, RawBar, StaticProvider};
use ohlcview_core::domain::{Bar, DerivedBar, Interval, Query, VOLUME_SCALE};
use ohlcview_core::table::ColumnSet;
use ohlcview_core::fetch_and_derive;
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..1000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_volume() -> impl Strategy<Value = u64> {
    0..5_000_000_000u64
}

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn arb_bar() -> impl Strategy<Value = Bar> {
    (arb_price(), arb_price(), arb_price(), arb_price(), arb_volume()).prop_map(
        |(a, b, c, d, volume)| {
            let mut prices = [a, b, c, d];
            prices.sort_by(|x, y| x.total_cmp(y));
            Bar {
                timestamp: base_time(),
                open: prices[1],
                high: prices[3],
                low: prices[0],
                close: prices[2],
                volume,
            }
        },
    )
}

/// A raw row plus a mask of which fields to null out.
fn arb_raw_rows() -> impl Strategy<Value = Vec<(Bar, [bool; 5])>> {
    prop::collection::vec((arb_bar(), prop::array::uniform5(prop::bool::weighted(0.1))), 1..60)
}

fn query() -> Query {
    Query::new(
        "SPY",
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        Interval::M5,
    )
    .unwrap()
}

// ── 1. Derivation ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn derived_columns_are_exact(bar in arb_bar()) {
        let d = DerivedBar::from_bar(bar);
        prop_assert_eq!(d.oc(), bar.close - bar.open);
        prop_assert_eq!(d.range(), bar.high - bar.low);
        prop_assert!(d.range() >= 0.0);
        let rebuilt = d.rv() * VOLUME_SCALE;
        prop_assert!((rebuilt - bar.volume as f64).abs() <= 1e-6 * (bar.volume as f64).max(1.0));
    }
}

// ── 2./3. Filtering keeps count and order ────────────────────────────

proptest! {
    #[test]
    fn filter_keeps_exactly_the_complete_rows_in_order(rows in arb_raw_rows()) {
        let raw: Vec<RawBar> = rows
            .iter()
            .enumerate()
            .map(|(i, (bar, nulls))| RawBar {
                timestamp: base_time() + Duration::minutes(5 * i as i64),
                open: (!nulls[0]).then_some(bar.open),
                high: (!nulls[1]).then_some(bar.high),
                low: (!nulls[2]).then_some(bar.low),
                close: (!nulls[3]).then_some(bar.close),
                volume: (!nulls[4]).then_some(bar.volume),
            })
            .collect();
        let expected: Vec<Bar> = raw.iter().filter_map(|r| r.into_bar()).collect();

        let provider = StaticProvider::new(raw_bars_to_frame(&raw).unwrap());
        let outcome = fetch_and_derive(&provider, &query(), &ColumnSet::Derived).unwrap();

        prop_assert_eq!(outcome.table.len(), expected.len());
        for (row, bar) in outcome.table.rows.iter().zip(&expected) {
            prop_assert_eq!(row.bar.bar(), bar);
        }

        let dropped = raw.len() - expected.len();
        if dropped == 0 {
            prop_assert!(outcome.warnings.is_empty());
        } else {
            prop_assert_eq!(outcome.warnings.len(), 1);
            prop_assert_eq!(outcome.warnings[0].dropped, dropped);
        }
    }
}
