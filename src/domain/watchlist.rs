//! Watchlist rows and their strategy kinds.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;

use super::money::parse_decimal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyKind {
    Dip,
    Breakout,
    Range,
    /// Empty or unrecognized strategy text, kept as written.
    Other(String),
}

impl StrategyKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "dip" => StrategyKind::Dip,
            "breakout" => StrategyKind::Breakout,
            "range" => StrategyKind::Range,
            _ => StrategyKind::Other(raw.trim().to_string()),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Dip => write!(f, "dip"),
            StrategyKind::Breakout => write!(f, "breakout"),
            StrategyKind::Range => write!(f, "range"),
            StrategyKind::Other(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatchlistEntry {
    pub ticker: String,
    pub strategy: StrategyKind,
    pub buy_below: Option<Decimal>,
    pub buy_above: Option<Decimal>,
    pub range_low: Option<Decimal>,
    pub range_high: Option<Decimal>,
    pub min_rsi: Option<Decimal>,
}

impl WatchlistEntry {
    /// An entry with the given ticker and strategy and no thresholds.
    pub fn new(ticker: impl Into<String>, strategy: StrategyKind) -> Self {
        Self {
            ticker: ticker.into(),
            strategy,
            buy_below: None,
            buy_above: None,
            range_low: None,
            range_high: None,
            min_rsi: None,
        }
    }

    /// Build an entry from a header→cell map with lowercased header names.
    ///
    /// Returns `None` when the ticker is blank. Missing or non-numeric
    /// threshold cells become absent values.
    pub fn from_fields(fields: &HashMap<String, String>) -> Option<Self> {
        let ticker = fields.get("ticker").map(|t| t.trim()).unwrap_or_default();
        if ticker.is_empty() {
            return None;
        }

        let number = |key: &str| fields.get(key).and_then(|v| parse_decimal(v));

        Some(Self {
            ticker: ticker.to_uppercase(),
            strategy: StrategyKind::parse(
                fields.get("strategy").map(String::as_str).unwrap_or_default(),
            ),
            buy_below: number("buy_below"),
            buy_above: number("buy_above"),
            range_low: number("range_low"),
            range_high: number("range_high"),
            min_rsi: number("min_rsi"),
        })
    }
}
