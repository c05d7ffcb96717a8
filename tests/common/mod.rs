#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sentinel::domain::error::SentinelError;
pub use sentinel::domain::price::PriceBar;
use sentinel::domain::trade::{TradeAction, TradeRecord};
use sentinel::domain::watchlist::{StrategyKind, WatchlistEntry};
use sentinel::ports::price_port::PricePort;
use sentinel::ports::trade_log_port::TradeLogPort;
use sentinel::ports::watchlist_port::WatchlistPort;
use std::collections::HashMap;

pub struct MockWatchlist {
    pub entries: Vec<WatchlistEntry>,
    pub error: Option<String>,
}

impl MockWatchlist {
    pub fn new(entries: Vec<WatchlistEntry>) -> Self {
        Self {
            entries,
            error: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            entries: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl WatchlistPort for MockWatchlist {
    fn load_watchlist(&self) -> Result<Vec<WatchlistEntry>, SentinelError> {
        match &self.error {
            Some(reason) => Err(SentinelError::DataSource {
                path: "watchlist.csv".into(),
                reason: reason.clone(),
            }),
            None => Ok(self.entries.clone()),
        }
    }
}

pub struct MockTradeLog {
    pub trades: Vec<TradeRecord>,
}

impl MockTradeLog {
    pub fn new(trades: Vec<TradeRecord>) -> Self {
        Self { trades }
    }
}

impl TradeLogPort for MockTradeLog {
    fn load_trades(&self) -> Result<Vec<TradeRecord>, SentinelError> {
        Ok(self.trades.clone())
    }
}

pub struct MockPricePort {
    pub latest: HashMap<String, Decimal>,
    pub history: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            latest: HashMap::new(),
            history: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_price(mut self, ticker: &str, price: Decimal) -> Self {
        self.latest.insert(ticker.to_string(), price);
        self
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
        self.history.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }

    fn check(&self, ticker: &str) -> Result<(), SentinelError> {
        match self.errors.get(ticker) {
            Some(reason) => Err(SentinelError::PriceData {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl PricePort for MockPricePort {
    fn latest_price(&self, ticker: &str) -> Result<Option<Decimal>, SentinelError> {
        self.check(ticker)?;
        Ok(self.latest.get(ticker).copied())
    }

    fn price_history(&self, ticker: &str, bars: usize) -> Result<Vec<PriceBar>, SentinelError> {
        self.check(ticker)?;
        let history = self.history.get(ticker).cloned().unwrap_or_default();
        let skip = history.len().saturating_sub(bars);
        Ok(history.into_iter().skip(skip).collect())
    }
}

pub fn make_bar(date: &str, close: Decimal) -> PriceBar {
    PriceBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        close,
    }
}

/// Consecutive daily bars starting 2024-01-01.
pub fn make_bars(closes: &[Decimal]) -> Vec<PriceBar> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: start + chrono::Duration::days(i as i64),
            close,
        })
        .collect()
}

pub fn make_trade(ticker: &str, action: TradeAction, price: Decimal, quantity: Decimal) -> TradeRecord {
    TradeRecord {
        timestamp: "2024-03-01 09:30:00".to_string(),
        ticker: ticker.to_string(),
        action,
        price,
        quantity,
    }
}

pub fn dip(ticker: &str, buy_below: Decimal) -> WatchlistEntry {
    let mut entry = WatchlistEntry::new(ticker, StrategyKind::Dip);
    entry.buy_below = Some(buy_below);
    entry
}

pub fn breakout(ticker: &str, buy_above: Decimal) -> WatchlistEntry {
    let mut entry = WatchlistEntry::new(ticker, StrategyKind::Breakout);
    entry.buy_above = Some(buy_above);
    entry
}

pub fn range(ticker: &str, low: Decimal, high: Decimal) -> WatchlistEntry {
    let mut entry = WatchlistEntry::new(ticker, StrategyKind::Range);
    entry.range_low = Some(low);
    entry.range_high = Some(high);
    entry
}
