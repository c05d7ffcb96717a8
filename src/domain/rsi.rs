//! RSI (Relative Strength Index) over a close-price history.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over the first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: the first n bars have no value (n price changes are needed).

use rust_decimal::prelude::ToPrimitive;

use super::price::PriceBar;

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// RSI values aligned with `bars`; `None` during warmup.
pub fn calculate_rsi(bars: &[PriceBar], period: usize) -> Vec<Option<f64>> {
    if period == 0 || bars.len() < 2 {
        return vec![None; bars.len()];
    }

    let closes: Vec<f64> = bars
        .iter()
        .map(|b| b.close.to_f64().unwrap_or(0.0))
        .collect();

    let mut values = Vec::with_capacity(bars.len());
    values.push(None);

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for (i, window) in closes.windows(2).enumerate() {
        let change = window[1] - window[0];
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };

        if i < period {
            avg_gain += gain / period as f64;
            avg_loss += loss / period as f64;
        } else {
            avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
        }

        if i + 1 < period {
            values.push(None);
        } else if avg_loss == 0.0 {
            values.push(Some(100.0));
        } else {
            values.push(Some(100.0 - (100.0 / (1.0 + avg_gain / avg_loss))));
        }
    }

    values
}

/// The most recent RSI value, if the history is past warmup.
pub fn latest_rsi(bars: &[PriceBar], period: usize) -> Option<f64> {
    calculate_rsi(bars, period).last().copied().flatten()
}
