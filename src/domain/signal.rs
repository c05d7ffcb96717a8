//! Watchlist signal evaluation.
//!
//! Maps one watchlist entry and a live price to a status/reason pair. Exactly
//! one branch fires, checked in order:
//! - dip: price strictly below `buy_below`
//! - breakout: price strictly above `buy_above`
//! - range: price within `[range_low, range_high]`, otherwise out of range
//!
//! Dip and breakout fall back to `(Neutral, Holding)` when the price or the
//! threshold is missing. Range fails closed: once both bounds are present a
//! missing price reports `OutOfRange`.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::fmt;

use super::watchlist::{StrategyKind, WatchlistEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalStatus {
    Neutral,
    Favorable,
    Unfavorable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalReason {
    Holding,
    DipOpportunity,
    BreakoutSignal,
    InRange,
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalResult {
    pub status: SignalStatus,
    pub reason: SignalReason,
}

impl SignalResult {
    pub const HOLDING: SignalResult = SignalResult {
        status: SignalStatus::Neutral,
        reason: SignalReason::Holding,
    };

    fn new(status: SignalStatus, reason: SignalReason) -> Self {
        Self { status, reason }
    }
}

impl Default for SignalResult {
    fn default() -> Self {
        Self::HOLDING
    }
}

impl fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalStatus::Neutral => write!(f, "Neutral"),
            SignalStatus::Favorable => write!(f, "Favorable"),
            SignalStatus::Unfavorable => write!(f, "Unfavorable"),
        }
    }
}

impl fmt::Display for SignalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalReason::Holding => write!(f, "Holding"),
            SignalReason::DipOpportunity => write!(f, "Dip Opportunity"),
            SignalReason::BreakoutSignal => write!(f, "Breakout Signal"),
            SignalReason::InRange => write!(f, "In Range"),
            SignalReason::OutOfRange => write!(f, "Out of Range"),
        }
    }
}

pub fn evaluate(entry: &WatchlistEntry, live_price: Option<Decimal>) -> SignalResult {
    match (&entry.strategy, live_price) {
        (StrategyKind::Dip, Some(price)) if entry.buy_below.is_some_and(|t| price < t) => {
            SignalResult::new(SignalStatus::Favorable, SignalReason::DipOpportunity)
        }
        (StrategyKind::Breakout, Some(price)) if entry.buy_above.is_some_and(|t| price > t) => {
            SignalResult::new(SignalStatus::Favorable, SignalReason::BreakoutSignal)
        }
        (StrategyKind::Range, price) => match (entry.range_low, entry.range_high) {
            (Some(low), Some(high)) => match price {
                Some(p) if low <= p && p <= high => {
                    SignalResult::new(SignalStatus::Favorable, SignalReason::InRange)
                }
                _ => SignalResult::new(SignalStatus::Unfavorable, SignalReason::OutOfRange),
            },
            _ => SignalResult::HOLDING,
        },
        _ => SignalResult::HOLDING,
    }
}

/// Advisory RSI check against the entry's `min_rsi`.
///
/// `Some(true)` when the RSI is at or above the threshold, `None` when either
/// side is unknown. Never influences [`evaluate`].
pub fn check_rsi(entry: &WatchlistEntry, rsi: Option<f64>) -> Option<bool> {
    let threshold = entry.min_rsi?.to_f64()?;
    rsi.map(|value| value >= threshold)
}
