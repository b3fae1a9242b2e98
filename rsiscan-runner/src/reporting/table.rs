//! Console table for a scan.
//!
//! Cells are built as plain text, column widths are measured on that plain
//! text, and colour is applied only after padding. ANSI escapes therefore
//! never shift the columns.

use chrono::NaiveDateTime;
use rsiscan_core::{MarketRecord, RecordStatus, Signal, SignalRules, TrendZone};

use crate::config::ScanConfig;
use crate::scanner::ScanReport;

const SEPARATOR_MIN: usize = 65;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colour {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Colour {
    fn code(self) -> &'static str {
        match self {
            Self::Red => "\u{1b}[91m",
            Self::Green => "\u{1b}[92m",
            Self::Yellow => "\u{1b}[93m",
            Self::Blue => "\u{1b}[94m",
        }
    }
}

const RESET: &str = "\u{1b}[0m";

/// Terminal decoration. `Plain` for pipes, files and webhooks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Palette {
    #[default]
    Ansi,
    Plain,
}

impl Palette {
    pub fn paint(self, text: &str, colour: Option<Colour>) -> String {
        match (self, colour) {
            (Self::Ansi, Some(c)) => format!("{}{text}{RESET}", c.code()),
            _ => text.to_string(),
        }
    }
}

/// Colour of the RSI value relative to the symbol's buy limit.
pub fn rsi_colour(rsi: f64, limit: f64, rules: &SignalRules) -> Option<Colour> {
    if rsi <= limit {
        Some(Colour::Green)
    } else if rsi <= limit + rules.watch_band {
        Some(Colour::Yellow)
    } else if rsi >= rules.overbought {
        Some(Colour::Red)
    } else {
        None
    }
}

pub fn signal_colour(signal: Signal) -> Option<Colour> {
    match signal {
        Signal::StrongBuy => Some(Colour::Green),
        Signal::Watch => Some(Colour::Yellow),
        Signal::StrongSell => Some(Colour::Red),
        Signal::Hold => Some(Colour::Blue),
        Signal::Wait => None,
    }
}

fn zone_colour(zone: TrendZone) -> Option<Colour> {
    match zone {
        TrendZone::StrongBull => Some(Colour::Green),
        TrendZone::GrayZone => Some(Colour::Yellow),
        TrendZone::Bearish | TrendZone::DeepBearish => Some(Colour::Red),
    }
}

/// Human wording for a signal, e.g. `STRONG BUY (RSI <= 40)`.
pub fn signal_text(signal: Signal, limit: f64) -> String {
    let name = signal.label().replace('_', " ");
    match signal {
        Signal::StrongBuy => format!("{name} (RSI <= {limit})"),
        _ => format!("{name} ({})", signal.meaning()),
    }
}

struct Cell {
    text: String,
    colour: Option<Colour>,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            colour: None,
        }
    }

    fn coloured(text: impl Into<String>, colour: Option<Colour>) -> Self {
        Self {
            text: text.into(),
            colour,
        }
    }
}

fn row_cells(record: &MarketRecord, synthetic: bool, rules: &SignalRules) -> Vec<Cell> {
    let symbol = if synthetic {
        format!("{}*", record.symbol)
    } else {
        record.symbol.clone()
    };
    let price = record
        .price
        .map_or_else(|| "N/A".to_string(), |p| format!("{p:.2}"));

    let rsi = match record.rsi {
        Some(v) => Cell::coloured(format!("{v:.2}"), rsi_colour(v, record.buy_limit, rules)),
        None => Cell::plain("N/A"),
    };

    let trend = match &record.trend {
        Some(t) => Cell::coloured(
            format!("{} ({:+.2}%)", t.zone, t.gap_pct),
            zone_colour(t.zone),
        ),
        None => Cell::plain("-"),
    };

    let support = match &record.support {
        Some(s) => Cell::plain(format!("{:+.2}% from low", s.distance_pct)),
        None => Cell::plain("-"),
    };

    let action = match (&record.status, record.signal) {
        (RecordStatus::Complete, Some(signal)) => {
            Cell::coloured(signal_text(signal, record.buy_limit), signal_colour(signal))
        }
        (RecordStatus::Unavailable { reason }, _) => {
            Cell::plain(format!("Data Not Found ({reason})"))
        }
        (RecordStatus::Incomplete { reason }, _) => {
            Cell::plain(format!("Incomplete ({reason})"))
        }
        (RecordStatus::Complete, None) => Cell::plain("-"),
    };

    vec![Cell::plain(symbol), Cell::plain(price), rsi, trend, support, action]
}

/// Render the scan as a table followed by the strategy footer.
///
/// `executed_at` is supplied by the caller; rendering never reads the clock.
pub fn render_table(
    report: &ScanReport,
    config: &ScanConfig,
    palette: Palette,
    executed_at: NaiveDateTime,
) -> String {
    let headers = [
        "Ticker".to_string(),
        "Price".to_string(),
        format!("RSI({})", config.indicators.rsi_period),
        format!("Trend vs MA{}", config.indicators.ma_window),
        format!("Support ({}d)", config.indicators.support_window),
        "Action Signal".to_string(),
    ];

    let rows: Vec<Vec<Cell>> = report
        .records
        .iter()
        .map(|r| row_cells(r, report.is_synthetic(&r.symbol), &config.rules))
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.text.chars().count());
        }
    }

    let last = headers.len() - 1;
    let line_width = widths[..last].iter().map(|w| w + 3).sum::<usize>() + widths[last];
    let separator = "-".repeat(line_width.max(SEPARATOR_MIN));

    let mut out = String::new();
    out.push('\n');
    let header_cells: Vec<Cell> = headers.into_iter().map(Cell::plain).collect();
    push_row(&mut out, &header_cells, &widths, palette);
    out.push_str(&separator);
    out.push('\n');
    for row in &rows {
        push_row(&mut out, row, &widths, palette);
    }
    out.push_str(&separator);
    out.push('\n');

    out.push_str(&format!(
        "Strategy based on Dynamic Thresholds ({})\n",
        config.threshold_summary()
    ));
    if config.features.trend_gate {
        out.push_str(&format!(
            "Trend gate: gray band +/-{}%, deep bearish below -{}%\n",
            config.trend.gray_band_pct, config.trend.deep_band_pct
        ));
    }
    if !report.synthetic.is_empty() {
        out.push_str("* synthetic data, not market prices\n");
    }
    out.push_str(&format!(
        "Execution Time: {}\n",
        executed_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out
}

fn push_row(out: &mut String, cells: &[Cell], widths: &[usize], palette: Palette) {
    let last = cells.len() - 1;
    for (i, (cell, &width)) in cells.iter().zip(widths).enumerate() {
        let text = if i == last {
            cell.text.clone()
        } else {
            format!("{:<width$}", cell.text)
        };
        out.push_str(&palette.paint(&text, cell.colour));
        if i != last {
            out.push_str(" | ");
        }
    }
    out.push('\n');
}
