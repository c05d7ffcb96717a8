//! Observed prices and short close-price histories.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub ticker: String,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: Decimal,
}

/// A ticker's price history as handed to the chart renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub ticker: String,
    pub bars: Vec<PriceBar>,
}

impl ChartSeries {
    pub fn latest_close(&self) -> Option<Decimal> {
        self.bars.last().map(|b| b.close)
    }
}

/// Ticker → latest price, with unknown prices kept as `None`.
pub type PriceMap = HashMap<String, Option<Decimal>>;

pub fn to_price_map(points: &[PricePoint]) -> PriceMap {
    points
        .iter()
        .map(|p| (p.ticker.clone(), p.price))
        .collect()
}
