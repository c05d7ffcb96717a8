//! CSV file adapters for the watchlist, trade log, and price history.

use crate::domain::error::SentinelError;
use crate::domain::money::parse_decimal;
use crate::domain::price::PriceBar;
use crate::domain::trade::TradeRecord;
use crate::domain::watchlist::WatchlistEntry;
use crate::ports::price_port::PricePort;
use crate::ports::trade_log_port::TradeLogPort;
use crate::ports::watchlist_port::WatchlistPort;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read a headed CSV file into header→cell maps.
///
/// Header names are trimmed and lowercased; short rows simply lack the
/// trailing columns. Returns `Ok(None)` when the file does not exist.
fn read_rows(path: &Path) -> Result<Option<Vec<HashMap<String, String>>>, SentinelError> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(SentinelError::DataSource {
                path: path.display().to_string(),
                reason: e.to_string(),
            });
        }
    };

    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| SentinelError::DataSource {
            path: path.display().to_string(),
            reason: format!("CSV header error: {}", e),
        })?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut rows: Vec<HashMap<String, String>> = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| SentinelError::DataSource {
            path: path.display().to_string(),
            reason: format!("CSV parse error: {}", e),
        })?;
        rows.push(
            headers
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_string))
                .collect(),
        );
    }

    Ok(Some(rows))
}

pub struct CsvWatchlistAdapter {
    path: PathBuf,
}

impl CsvWatchlistAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl WatchlistPort for CsvWatchlistAdapter {
    fn load_watchlist(&self) -> Result<Vec<WatchlistEntry>, SentinelError> {
        let rows = read_rows(&self.path)?.ok_or_else(|| SentinelError::DataSource {
            path: self.path.display().to_string(),
            reason: "file not found".into(),
        })?;

        let mut entries = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            match WatchlistEntry::from_fields(row) {
                Some(entry) => entries.push(entry),
                // +2: header line and 1-based numbering
                None => warn!(line = i + 2, path = %self.path.display(), "skipping watchlist row without ticker"),
            }
        }
        debug!(count = entries.len(), "loaded watchlist");
        Ok(entries)
    }
}

pub struct CsvTradeLogAdapter {
    path: PathBuf,
}

impl CsvTradeLogAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TradeLogPort for CsvTradeLogAdapter {
    fn load_trades(&self) -> Result<Vec<TradeRecord>, SentinelError> {
        let Some(rows) = read_rows(&self.path)? else {
            debug!(path = %self.path.display(), "no trade log yet");
            return Ok(Vec::new());
        };

        let mut trades = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            match TradeRecord::from_fields(row) {
                Ok(trade) => trades.push(trade),
                Err(e) => warn!(line = i + 2, path = %self.path.display(), error = %e, "skipping trade log row"),
            }
        }
        debug!(count = trades.len(), "loaded trade log");
        Ok(trades)
    }
}

/// Price history from a directory of `<TICKER>.csv` files with `date,close`
/// columns. The latest price is the most recent close.
pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }

    fn read_history(&self, ticker: &str) -> Result<Vec<PriceBar>, SentinelError> {
        let path = self.csv_path(ticker);
        let Some(rows) = read_rows(&path)? else {
            return Ok(Vec::new());
        };

        let mut bars = Vec::with_capacity(rows.len());
        for row in &rows {
            let date_str = row.get("date").ok_or_else(|| SentinelError::PriceData {
                ticker: ticker.to_string(),
                reason: "missing date column".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                SentinelError::PriceData {
                    ticker: ticker.to_string(),
                    reason: format!("invalid date {:?}: {}", date_str, e),
                }
            })?;
            let close_str = row.get("close").ok_or_else(|| SentinelError::PriceData {
                ticker: ticker.to_string(),
                reason: "missing close column".into(),
            })?;
            let close: Decimal =
                parse_decimal(close_str).ok_or_else(|| SentinelError::PriceData {
                    ticker: ticker.to_string(),
                    reason: format!("invalid close value {:?}", close_str),
                })?;

            bars.push(PriceBar { date, close });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

impl PricePort for CsvPriceAdapter {
    fn latest_price(&self, ticker: &str) -> Result<Option<Decimal>, SentinelError> {
        Ok(self.read_history(ticker)?.last().map(|b| b.close))
    }

    fn price_history(&self, ticker: &str, bars: usize) -> Result<Vec<PriceBar>, SentinelError> {
        let mut history = self.read_history(ticker)?;
        let skip = history.len().saturating_sub(bars);
        history.drain(..skip);
        Ok(history)
    }
}
