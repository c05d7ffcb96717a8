//! One dashboard refresh cycle.
//!
//! Loads the watchlist and trade log, fetches prices per ticker, evaluates
//! each watchlist row, aggregates positions once, and packages everything the
//! renderers need into a [`DashboardSnapshot`]. Failures at the data-source
//! boundary become absent values and [`Notice`]s; the cycle itself never
//! fails.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, warn};

use super::position::{PortfolioSummary, aggregate};
use super::price::{ChartSeries, PriceBar, PriceMap};
use super::rsi::{DEFAULT_RSI_PERIOD, latest_rsi};
use super::signal::{SignalResult, check_rsi, evaluate};
use super::trade::TradeRecord;
use super::watchlist::WatchlistEntry;
use crate::ports::price_port::PricePort;
use crate::ports::trade_log_port::TradeLogPort;
use crate::ports::watchlist_port::WatchlistPort;

pub const DEFAULT_HISTORY_BARS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSettings {
    /// Bars kept per chart series.
    pub history_bars: usize,
    pub rsi_period: usize,
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            history_bars: DEFAULT_HISTORY_BARS,
            rsi_period: DEFAULT_RSI_PERIOD,
        }
    }
}

impl CycleSettings {
    /// Bars to request from the provider: enough for both charts and RSI.
    pub fn bars_to_fetch(&self) -> usize {
        self.history_bars.max(self.rsi_period + 1)
    }
}

/// Data sources consumed by a cycle.
pub struct Sources<'a> {
    pub watchlist: &'a dyn WatchlistPort,
    pub trade_log: &'a dyn TradeLogPort,
    pub prices: &'a dyn PricePort,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    WatchlistUnavailable(String),
    NoChartData(String),
    NoTradeLog,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::WatchlistUnavailable(reason) => write!(f, "watchlist unavailable: {}", reason),
            Notice::NoChartData(ticker) => write!(f, "no chart data for {}", ticker),
            Notice::NoTradeLog => write!(f, "no trade log found yet"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatchlistRow {
    pub entry: WatchlistEntry,
    pub live_price: Option<Decimal>,
    pub signal: SignalResult,
    pub rsi: Option<f64>,
    /// Advisory `min_rsi` check, `None` when it cannot be decided.
    pub rsi_ok: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<WatchlistRow>,
    pub portfolio: PortfolioSummary,
    pub charts: Vec<ChartSeries>,
    pub trades: Vec<TradeRecord>,
    pub notices: Vec<Notice>,
}

/// Latest price for `ticker`, with provider errors reported and turned into
/// "price unknown".
pub fn fetch_price(port: &dyn PricePort, ticker: &str) -> Option<Decimal> {
    match port.latest_price(ticker) {
        Ok(price) => price,
        Err(e) => {
            warn!(ticker, error = %e, "price fetch failed");
            None
        }
    }
}

/// Recent history for `ticker`; provider errors yield an empty series.
pub fn fetch_history(port: &dyn PricePort, ticker: &str, bars: usize) -> Vec<PriceBar> {
    match port.price_history(ticker, bars) {
        Ok(history) => history,
        Err(e) => {
            warn!(ticker, error = %e, "price history fetch failed");
            Vec::new()
        }
    }
}

fn load_watchlist(port: &dyn WatchlistPort, notices: &mut Vec<Notice>) -> Vec<WatchlistEntry> {
    match port.load_watchlist() {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "failed to load watchlist");
            notices.push(Notice::WatchlistUnavailable(e.to_string()));
            Vec::new()
        }
    }
}

fn load_trades(port: &dyn TradeLogPort, notices: &mut Vec<Notice>) -> Vec<TradeRecord> {
    let trades = match port.load_trades() {
        Ok(trades) => trades,
        Err(e) => {
            warn!(error = %e, "failed to load trade log");
            Vec::new()
        }
    };
    if trades.is_empty() {
        notices.push(Notice::NoTradeLog);
    }
    trades
}

/// Watchlist tickers first, then tickers only seen in the trade log.
fn distinct_tickers(watchlist: &[WatchlistEntry], trades: &[TradeRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    watchlist
        .iter()
        .map(|e| e.ticker.as_str())
        .chain(trades.iter().map(|t| t.ticker.as_str()))
        .filter(|t| seen.insert(*t))
        .map(str::to_string)
        .collect()
}

fn tail(mut bars: Vec<PriceBar>, keep: usize) -> Vec<PriceBar> {
    let skip = bars.len().saturating_sub(keep);
    bars.drain(..skip);
    bars
}

pub fn run_cycle(
    sources: &Sources,
    settings: &CycleSettings,
    now: DateTime<Utc>,
) -> DashboardSnapshot {
    let mut notices = Vec::new();

    let watchlist = load_watchlist(sources.watchlist, &mut notices);
    let trades = load_trades(sources.trade_log, &mut notices);
    let tickers = distinct_tickers(&watchlist, &trades);
    info!(
        watchlist = watchlist.len(),
        trades = trades.len(),
        tickers = tickers.len(),
        "refreshing dashboard"
    );

    let watched: HashSet<&str> = watchlist.iter().map(|e| e.ticker.as_str()).collect();
    let mut price_map = PriceMap::new();
    let mut rsi_values = Vec::with_capacity(tickers.len());
    let mut charts = Vec::new();

    for ticker in &tickers {
        let history = fetch_history(sources.prices, ticker, settings.bars_to_fetch());
        let live = fetch_price(sources.prices, ticker).or_else(|| history.last().map(|b| b.close));
        debug!(ticker = %ticker, price = ?live, bars = history.len(), "fetched prices");

        price_map.insert(ticker.clone(), live);
        rsi_values.push((ticker.as_str(), latest_rsi(&history, settings.rsi_period)));

        if history.is_empty() {
            if watched.contains(ticker.as_str()) {
                notices.push(Notice::NoChartData(ticker.clone()));
            }
        } else {
            charts.push(ChartSeries {
                ticker: ticker.clone(),
                bars: tail(history, settings.history_bars),
            });
        }
    }

    let rows = watchlist
        .into_iter()
        .map(|entry| {
            let live_price = price_map.get(&entry.ticker).copied().flatten();
            let rsi = rsi_values
                .iter()
                .find(|(t, _)| *t == entry.ticker)
                .and_then(|(_, v)| *v);
            WatchlistRow {
                signal: evaluate(&entry, live_price),
                rsi_ok: check_rsi(&entry, rsi),
                live_price,
                rsi,
                entry,
            }
        })
        .collect();

    let portfolio = aggregate(&trades, &price_map);

    DashboardSnapshot {
        generated_at: now,
        rows,
        portfolio,
        charts,
        trades,
        notices,
    }
}
