//! RSI signal classification.
//!
//! An ordered rule list evaluated top to bottom; the first matching rule
//! wins and WAIT is the fallback. Order matters: with a high buy limit the
//! watch band can overlap the overbought line, and the watch band must win.
//!
//! Signals are plain categories. Colour and wording for display live in the
//! runner's report layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete action category for one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    StrongBuy,
    Watch,
    Hold,
    StrongSell,
    Wait,
}

impl Signal {
    pub const ALL: [Signal; 5] = [
        Signal::StrongBuy,
        Signal::Watch,
        Signal::Hold,
        Signal::StrongSell,
        Signal::Wait,
    ];

    /// Stable machine label, e.g. "STRONG_BUY".
    pub fn label(&self) -> &'static str {
        match self {
            Self::StrongBuy => "STRONG_BUY",
            Self::Watch => "WATCH",
            Self::Hold => "HOLD",
            Self::StrongSell => "STRONG_SELL",
            Self::Wait => "WAIT",
        }
    }

    /// Short human reading of the category.
    pub fn meaning(&self) -> &'static str {
        match self {
            Self::StrongBuy => "Buy Zone",
            Self::Watch => "Approaching Buy",
            Self::Hold => "Bullish",
            Self::StrongSell => "Overbought",
            Self::Wait => "Neutral",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Condition over (rsi, buy limit).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RsiCondition {
    /// rsi <= limit
    AtOrBelowLimit,
    /// limit < rsi <= limit + width
    AboveLimitWithin(f64),
    /// rsi >= level
    AtOrAbove(f64),
    /// low <= rsi < high
    Between { low: f64, high: f64 },
}

impl RsiCondition {
    pub fn matches(&self, rsi: f64, limit: f64) -> bool {
        match *self {
            Self::AtOrBelowLimit => rsi <= limit,
            Self::AboveLimitWithin(width) => rsi > limit && rsi <= limit + width,
            Self::AtOrAbove(level) => rsi >= level,
            Self::Between { low, high } => rsi >= low && rsi < high,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub condition: RsiCondition,
    pub signal: Signal,
}

impl Rule {
    pub fn new(condition: RsiCondition, signal: Signal) -> Self {
        Self { condition, signal }
    }
}

/// Tunable lines for the default rule list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalRules {
    /// Width of the approaching-buy band above the buy limit.
    pub watch_band: f64,
    /// Overbought line, independent of the buy limit.
    pub overbought: f64,
    /// Lower edge of the bullish hold band.
    pub bullish: f64,
}

impl Default for SignalRules {
    fn default() -> Self {
        Self {
            watch_band: 10.0,
            overbought: 70.0,
            bullish: 60.0,
        }
    }
}

impl SignalRules {
    /// Expand into the ordered rule list.
    pub fn to_rules(&self) -> Vec<Rule> {
        vec![
            Rule::new(RsiCondition::AtOrBelowLimit, Signal::StrongBuy),
            Rule::new(RsiCondition::AboveLimitWithin(self.watch_band), Signal::Watch),
            Rule::new(RsiCondition::AtOrAbove(self.overbought), Signal::StrongSell),
            Rule::new(
                RsiCondition::Between {
                    low: self.bullish,
                    high: self.overbought,
                },
                Signal::Hold,
            ),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalClassifier {
    rules: Vec<Rule>,
    fallback: Signal,
}

impl SignalClassifier {
    pub fn new(rules: &SignalRules) -> Self {
        Self::with_rules(rules.to_rules(), Signal::Wait)
    }

    pub fn with_rules(rules: Vec<Rule>, fallback: Signal) -> Self {
        Self { rules, fallback }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// First matching rule's signal, or the fallback.
    pub fn classify(&self, rsi: f64, limit: f64) -> Signal {
        self.rules
            .iter()
            .find(|r| r.condition.matches(rsi, limit))
            .map_or(self.fallback, |r| r.signal)
    }
}

impl Default for SignalClassifier {
    fn default() -> Self {
        Self::new(&SignalRules::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(rsi: f64, limit: f64) -> Signal {
        SignalClassifier::default().classify(rsi, limit)
    }

    #[test]
    fn default_limit_reference_points() {
        assert_eq!(classify(25.0, 30.0), Signal::StrongBuy);
        assert_eq!(classify(35.0, 30.0), Signal::Watch);
        assert_eq!(classify(50.0, 30.0), Signal::Wait);
        assert_eq!(classify(65.0, 30.0), Signal::Hold);
        assert_eq!(classify(75.0, 30.0), Signal::StrongSell);
    }

    #[test]
    fn boundaries_are_inclusive_where_documented() {
        assert_eq!(classify(30.0, 30.0), Signal::StrongBuy);
        assert_eq!(classify(40.0, 30.0), Signal::Watch);
        assert_eq!(classify(40.01, 30.0), Signal::Wait);
        assert_eq!(classify(60.0, 30.0), Signal::Hold);
        assert_eq!(classify(59.99, 30.0), Signal::Wait);
        assert_eq!(classify(70.0, 30.0), Signal::StrongSell);
    }

    #[test]
    fn looser_limit_widens_buy_zone() {
        // Index ETF with limit 40.
        assert_eq!(classify(38.0, 40.0), Signal::StrongBuy);
        assert_eq!(classify(45.0, 40.0), Signal::Watch);
        assert_eq!(classify(38.0, 30.0), Signal::Watch);
    }

    #[test]
    fn watch_band_takes_priority_over_overbought() {
        // limit 65 → watch band (65, 75] overlaps the 70 line.
        assert_eq!(classify(72.0, 65.0), Signal::Watch);
        assert_eq!(classify(76.0, 65.0), Signal::StrongSell);
    }

    #[test]
    fn buy_takes_priority_over_everything() {
        assert_eq!(classify(75.0, 80.0), Signal::StrongBuy);
    }

    #[test]
    fn nan_rsi_falls_through_to_wait() {
        assert_eq!(classify(f64::NAN, 30.0), Signal::Wait);
    }

    #[test]
    fn custom_lines_move_the_bands() {
        let classifier = SignalClassifier::new(&SignalRules {
            watch_band: 5.0,
            overbought: 80.0,
            bullish: 55.0,
        });
        assert_eq!(classifier.classify(38.0, 30.0), Signal::Wait);
        assert_eq!(classifier.classify(56.0, 30.0), Signal::Hold);
        assert_eq!(classifier.classify(75.0, 30.0), Signal::Hold);
        assert_eq!(classifier.classify(80.0, 30.0), Signal::StrongSell);
    }

    #[test]
    fn rule_list_order_is_auditable() {
        let signals: Vec<Signal> = SignalClassifier::default()
            .rules()
            .iter()
            .map(|r| r.signal)
            .collect();
        assert_eq!(
            signals,
            vec![
                Signal::StrongBuy,
                Signal::Watch,
                Signal::StrongSell,
                Signal::Hold
            ]
        );
    }

    #[test]
    fn labels_serialize_as_plain_text() {
        assert_eq!(serde_json::to_string(&Signal::StrongBuy).unwrap(), "\"STRONG_BUY\"");
        for s in Signal::ALL {
            assert_eq!(serde_json::to_value(s).unwrap(), s.label());
            assert_eq!(s.to_string(), s.label());
        }
    }
}
