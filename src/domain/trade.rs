//! Trade log records and the normalization step that produces them.
//!
//! Trade logs written by different tools disagree on column names (`qty` vs
//! `quantity`, `side` vs `action`). Every source funnels its rows through
//! [`TradeRecord::from_fields`] so the aggregator only ever sees one shape.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;

use super::money::parse_decimal;

const QUANTITY_COLUMNS: [&str; 3] = ["quantity", "qty", "shares"];
const ACTION_COLUMNS: [&str; 2] = ["action", "side"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeAction {
    Buy,
    Sell,
}

impl TradeAction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "buy" => Some(TradeAction::Buy),
            "sell" => Some(TradeAction::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "buy"),
            TradeAction::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub timestamp: String,
    pub ticker: String,
    pub action: TradeAction,
    pub price: Decimal,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TradeRowError {
    #[error("missing ticker")]
    MissingTicker,

    #[error("missing column: {0}")]
    MissingColumn(&'static str),

    #[error("unknown action: {0:?}")]
    UnknownAction(String),

    #[error("invalid {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

fn first_present<'a>(
    fields: &'a HashMap<String, String>,
    columns: &[&str],
) -> Option<&'a String> {
    columns.iter().find_map(|c| fields.get(*c))
}

fn positive(field: &'static str, raw: &str) -> Result<Decimal, TradeRowError> {
    match parse_decimal(raw) {
        Some(v) if v > Decimal::ZERO => Ok(v),
        _ => Err(TradeRowError::InvalidNumber {
            field,
            value: raw.to_string(),
        }),
    }
}

impl TradeRecord {
    /// Normalize a header→cell map (lowercased headers) into a record.
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, TradeRowError> {
        let ticker = fields
            .get("ticker")
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .ok_or(TradeRowError::MissingTicker)?;

        let action_raw =
            first_present(fields, &ACTION_COLUMNS).ok_or(TradeRowError::MissingColumn("action"))?;
        let action = TradeAction::parse(action_raw)
            .ok_or_else(|| TradeRowError::UnknownAction(action_raw.trim().to_string()))?;

        let price_raw = fields
            .get("price")
            .ok_or(TradeRowError::MissingColumn("price"))?;
        let quantity_raw = first_present(fields, &QUANTITY_COLUMNS)
            .ok_or(TradeRowError::MissingColumn("quantity"))?;

        let record = Self {
            timestamp: fields
                .get("timestamp")
                .map(|t| t.trim().to_string())
                .unwrap_or_default(),
            ticker,
            action,
            price: positive("price", price_raw)?,
            quantity: positive("quantity", quantity_raw)?,
        };

        // price * quantity must fit, or the row cannot take part in cost basis
        if record.notional().is_none() {
            return Err(TradeRowError::InvalidNumber {
                field: "notional",
                value: format!("{} x {}", price_raw.trim(), quantity_raw.trim()),
            });
        }
        Ok(record)
    }

    /// `price * quantity`, or `None` when it does not fit in a `Decimal`.
    pub fn notional(&self) -> Option<Decimal> {
        self.price.checked_mul(self.quantity)
    }
}
