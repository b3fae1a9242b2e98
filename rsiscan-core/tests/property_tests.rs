//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. RSI bounds: every defined RSI value lies in [0, 100]
//! 2. Monotone series: rising pins RSI at 100, falling at 0
//! 3. Classifier priority: first matching rule always wins
//! 4. Trend gate: zones are monotone in the gap
//! 5. Determinism: identical input gives identical records

use chrono::NaiveDate;
use proptest::prelude::*;
use rsiscan_core::indicators::{Indicator, Rsi};
use rsiscan_core::{
    MarketRecordBuilder, PricePoint, PriceSeries, Signal, SignalClassifier, ThresholdEntry,
    TrendGate, TrendZone,
};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_closes(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..1000.0_f64, min_len..max_len)
}

fn arb_rsi() -> impl Strategy<Value = f64> {
    0.0..=100.0_f64
}

fn arb_limit() -> impl Strategy<Value = f64> {
    0.0..=100.0_f64
}

fn to_series(symbol: &str, closes: &[f64]) -> PriceSeries {
    let base = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    PriceSeries::new(
        symbol,
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::new(base + chrono::Duration::days(i as i64), c))
            .collect(),
    )
    .unwrap()
}

fn zone_rank(zone: TrendZone) -> u8 {
    match zone {
        TrendZone::DeepBearish => 0,
        TrendZone::Bearish => 1,
        TrendZone::GrayZone => 2,
        TrendZone::StrongBull => 3,
    }
}

// ── 1. RSI bounds ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn rsi_stays_within_bounds(closes in arb_closes(2, 300), period in 1usize..40) {
        let values = Rsi::new(period).compute(&closes);
        prop_assert!(values[0].is_nan());
        for v in &values[1..] {
            prop_assert!((0.0..=100.0).contains(v), "rsi out of bounds: {}", v);
        }
    }
}

// ── 2. Monotone series ───────────────────────────────────────────────

proptest! {
    #[test]
    fn strictly_rising_series_reads_100(start in 1.0..500.0_f64, steps in prop::collection::vec(0.01..5.0_f64, 21..200)) {
        let mut closes = vec![start];
        for step in steps {
            let next = closes.last().unwrap() + step;
            closes.push(next);
        }
        prop_assert_eq!(Rsi::default().latest(&closes).unwrap(), 100.0);
    }

    #[test]
    fn strictly_falling_series_reads_0(start in 600.0..1000.0_f64, steps in prop::collection::vec(0.01..2.0_f64, 2..200)) {
        let mut closes = vec![start];
        for step in steps {
            let next = closes.last().unwrap() - step;
            closes.push(next);
        }
        prop_assert_eq!(Rsi::default().latest(&closes).unwrap(), 0.0);
    }
}

// ── 3. Classifier priority ───────────────────────────────────────────

proptest! {
    #[test]
    fn at_or_below_limit_is_always_strong_buy(limit in arb_limit(), below in 0.0..=100.0_f64) {
        let rsi = below.min(limit);
        prop_assert_eq!(SignalClassifier::default().classify(rsi, limit), Signal::StrongBuy);
    }

    #[test]
    fn watch_band_beats_overbought(limit in arb_limit(), offset in 0.001..=10.0_f64) {
        let rsi = limit + offset;
        prop_assert_eq!(SignalClassifier::default().classify(rsi, limit), Signal::Watch);
    }

    #[test]
    fn outside_buy_bands_follows_fixed_lines(limit in 0.0..=20.0_f64, rsi in arb_rsi()) {
        prop_assume!(rsi > limit + 10.0);
        let expected = if rsi >= 70.0 {
            Signal::StrongSell
        } else if rsi >= 60.0 {
            Signal::Hold
        } else {
            Signal::Wait
        };
        prop_assert_eq!(SignalClassifier::default().classify(rsi, limit), expected);
    }
}

// ── 4. Trend gate ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn trend_zone_is_monotone_in_gap(a in -50.0..50.0_f64, b in -50.0..50.0_f64) {
        let gate = TrendGate::default();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(zone_rank(gate.classify(lo)) <= zone_rank(gate.classify(hi)));
    }

    #[test]
    fn gray_band_is_symmetric_and_inclusive(gap in -3.0..=3.0_f64) {
        prop_assert_eq!(TrendGate::default().classify(gap), TrendZone::GrayZone);
    }
}

// ── 5. Determinism ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn record_building_is_idempotent(closes in arb_closes(1, 250), limit in arb_limit()) {
        let series = to_series("PROP", &closes);
        let entry = ThresholdEntry { symbol: "PROP".into(), limit, configured: true };
        let builder = MarketRecordBuilder::default();
        let first = serde_json::to_string(&builder.build(&series, &entry)).unwrap();
        let second = serde_json::to_string(&builder.build(&series, &entry)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn short_history_never_yields_a_signal(closes in arb_closes(1, 120)) {
        let series = to_series("PROP", &closes);
        let entry = ThresholdEntry { symbol: "PROP".into(), limit: 30.0, configured: false };
        let record = MarketRecordBuilder::default().build(&series, &entry);
        prop_assert!(!record.is_complete());
        prop_assert!(record.signal.is_none());
        prop_assert!(record.rsi.is_none());
    }
}
