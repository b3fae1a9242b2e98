//! End-to-end engine tests: series in, records out.

use chrono::NaiveDate;
use rsiscan_core::data::synthetic_series;
use rsiscan_core::{
    EngineSettings, FeatureFlags, MarketRecord, MarketRecordBuilder, PricePoint, PriceSeries,
    RecordStatus, Signal, ThresholdTable, TrendGate, TrendZone,
};

fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
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

fn watchlist_table() -> ThresholdTable {
    ThresholdTable::new(
        30.0,
        [
            ("QQQM".to_string(), 40.0),
            ("BLOK".to_string(), 35.0),
            ("GLXY".to_string(), 30.0),
            ("CRCL".to_string(), 30.0),
            ("COIN".to_string(), 30.0),
        ],
    )
    .unwrap()
}

fn build(s: &PriceSeries) -> MarketRecord {
    MarketRecordBuilder::default().build_for(s, &watchlist_table())
}

/// 130 flat points then a steady slide: RSI pinned at 0 and price below MA.
fn slide(symbol: &str, slide_len: usize, step: f64) -> PriceSeries {
    let mut closes = vec![100.0; 130];
    for i in 1..=slide_len {
        closes.push(100.0 - step * i as f64);
    }
    series(symbol, &closes)
}

#[test]
fn gentle_pullback_sits_in_gray_zone_with_strong_buy() {
    // 4 steps of 0.5 → price 98, MA ≈ 99.93 → gap ≈ -1.93%
    let record = build(&slide("QQQM", 4, 0.5));
    assert_eq!(record.status, RecordStatus::Complete);
    assert_eq!(record.rsi, Some(0.0));
    assert_eq!(record.signal, Some(Signal::StrongBuy));
    assert_eq!(record.buy_limit, 40.0);
    assert_eq!(record.trend.unwrap().zone, TrendZone::GrayZone);
}

#[test]
fn deeper_slide_turns_bearish() {
    // 10 steps of 0.6 → price 94, MA ≈ 99.73 → gap ≈ -5.75%
    let record = build(&slide("COIN", 10, 0.6));
    assert_eq!(record.trend.unwrap().zone, TrendZone::Bearish);
}

#[test]
fn crash_is_deep_bearish() {
    // 10 steps of 2.0 → price 80, MA ≈ 99.08 → gap ≈ -19%
    let record = build(&slide("GLXY", 10, 2.0));
    assert_eq!(record.trend.unwrap().zone, TrendZone::DeepBearish);
}

#[test]
fn wider_gate_reclassifies_the_same_series() {
    let settings = EngineSettings {
        trend: TrendGate::new(6.0, 20.0).unwrap(),
        ..EngineSettings::default()
    };
    let builder = MarketRecordBuilder::new(&settings);
    let record = builder.build_for(&slide("COIN", 10, 0.6), &watchlist_table());
    assert_eq!(record.trend.unwrap().zone, TrendZone::GrayZone);
    let record = builder.build_for(&slide("GLXY", 10, 2.0), &watchlist_table());
    assert_eq!(record.trend.unwrap().zone, TrendZone::Bearish);
}

#[test]
fn support_distance_reflects_recent_low() {
    // Dip to 80 inside the last 90 points, then recovery to 84.
    let mut closes = vec![100.0; 100];
    closes.extend([90.0, 80.0, 82.0, 84.0]);
    closes.extend(vec![84.0; 20]);
    let s = series("BLOK", &closes);
    let record = build(&s);
    let support = record.support.unwrap();
    assert_eq!(support.low, 80.0);
    assert_eq!(support.distance_pct, 5.0);
}

#[test]
fn short_and_full_histories_are_isolated() {
    let builder = MarketRecordBuilder::default();
    let table = watchlist_table();
    let short = builder.build_for(&series("CRCL", &[30.0, 31.0, 29.5]), &table);
    let coin = synthetic_series(
        "COIN",
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
    );
    let full = builder.build_for(&coin, &table);

    assert!(matches!(short.status, RecordStatus::Incomplete { .. }));
    assert!(full.is_complete());
    let rsi = full.rsi.unwrap();
    assert!((0.0..=100.0).contains(&rsi));
}

#[test]
fn rsi_only_mode_classifies_short_histories() {
    let settings = EngineSettings {
        features: FeatureFlags {
            support_distance: false,
            trend_gate: false,
        },
        ..EngineSettings::default()
    };
    let record = MarketRecordBuilder::new(&settings)
        .build_for(&series("CRCL", &[30.0, 31.0, 29.5]), &watchlist_table());
    assert!(record.is_complete());
    assert!(record.signal.is_some());
    assert!(record.trend.is_none());
    assert!(record.support.is_none());
}

#[test]
fn records_serialize_without_display_markup() {
    let record = build(&slide("QQQM", 4, 0.5));
    let json = serde_json::to_string(&record).unwrap();
    assert!(!json.contains('\u{1b}'));
    assert!(json.contains("\"signal\":\"STRONG_BUY\""));
    assert!(json.contains("\"zone\":\"GRAY_ZONE\""));
}
