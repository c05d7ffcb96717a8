//! Position and PnL aggregation from the trade log.
//!
//! Cost basis is a pooled volume-weighted average per side, not lot
//! matching: realized PnL is `(avg_sell - avg_buy) * min(bought, sold)`.
//! Unrealized PnL is only reported for net-long positions with a known
//! live price; flat and net-short positions report zero.

use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::warn;

use super::money::round_money;
use super::price::PriceMap;
use super::trade::{TradeAction, TradeRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct PositionSummary {
    pub ticker: String,
    pub open_quantity: Decimal,
    pub live_price: Option<Decimal>,
    pub avg_buy_price: Decimal,
    pub avg_sell_price: Decimal,
    pub realized_pnl: Decimal,
    pub unrealized_pnl: Decimal,
}

impl PositionSummary {
    pub fn is_long(&self) -> bool {
        self.open_quantity > Decimal::ZERO
    }

    pub fn is_short(&self) -> bool {
        self.open_quantity < Decimal::ZERO
    }

    /// Copy with monetary fields rounded to cents for display.
    pub fn rounded(&self) -> Self {
        Self {
            ticker: self.ticker.clone(),
            open_quantity: self.open_quantity,
            live_price: self.live_price.map(round_money),
            avg_buy_price: round_money(self.avg_buy_price),
            avg_sell_price: round_money(self.avg_sell_price),
            realized_pnl: round_money(self.realized_pnl),
            unrealized_pnl: round_money(self.unrealized_pnl),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PortfolioSummary {
    /// One entry per ticker, in the order tickers first appear in the log.
    pub positions: Vec<PositionSummary>,
    pub total_realized_pnl: Decimal,
    pub total_unrealized_pnl: Decimal,
}

impl PortfolioSummary {
    pub fn get(&self, ticker: &str) -> Option<&PositionSummary> {
        self.positions.iter().find(|p| p.ticker == ticker)
    }

    pub fn total_pnl(&self) -> Decimal {
        self.total_realized_pnl
            .saturating_add(self.total_unrealized_pnl)
    }
}

#[derive(Default)]
struct SideTotals {
    quantity: Decimal,
    notional: Decimal,
}

impl SideTotals {
    /// Fold a trade in. Returns `false` and leaves the totals untouched when
    /// either running sum would overflow.
    fn add(&mut self, trade: &TradeRecord) -> bool {
        let next = trade.notional().and_then(|notional| {
            Some((
                self.quantity.checked_add(trade.quantity)?,
                self.notional.checked_add(notional)?,
            ))
        });
        match next {
            Some((quantity, notional)) => {
                self.quantity = quantity;
                self.notional = notional;
                true
            }
            None => false,
        }
    }

    fn average_price(&self) -> Decimal {
        if self.quantity > Decimal::ZERO {
            self.notional
                .checked_div(self.quantity)
                .unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        }
    }
}

/// `(exit - entry) * quantity`, zero when it does not fit in a `Decimal`.
fn pnl(ticker: &str, kind: &str, exit: Decimal, entry: Decimal, quantity: Decimal) -> Decimal {
    match exit
        .checked_sub(entry)
        .and_then(|gap| gap.checked_mul(quantity))
    {
        Some(value) => value,
        None => {
            warn!(ticker, kind, "PnL overflows, reporting zero");
            Decimal::ZERO
        }
    }
}

#[derive(Default)]
struct TickerTotals {
    bought: SideTotals,
    sold: SideTotals,
}

impl TickerTotals {
    fn summarize(&self, ticker: &str, live_price: Option<Decimal>) -> PositionSummary {
        let avg_buy_price = self.bought.average_price();
        let avg_sell_price = self.sold.average_price();
        let matched = self.bought.quantity.min(self.sold.quantity);
        // both sides are non-negative, so the difference cannot overflow
        let open_quantity = self.bought.quantity - self.sold.quantity;

        let unrealized_pnl = match live_price {
            Some(price) if open_quantity > Decimal::ZERO => {
                pnl(ticker, "unrealized", price, avg_buy_price, open_quantity)
            }
            _ => Decimal::ZERO,
        };

        PositionSummary {
            ticker: ticker.to_string(),
            open_quantity,
            live_price,
            avg_buy_price,
            avg_sell_price,
            realized_pnl: pnl(ticker, "realized", avg_sell_price, avg_buy_price, matched),
            unrealized_pnl,
        }
    }
}

pub fn aggregate(trades: &[TradeRecord], live_prices: &PriceMap) -> PortfolioSummary {
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, TickerTotals> = HashMap::new();

    for trade in trades {
        let entry = totals.entry(trade.ticker.as_str()).or_insert_with(|| {
            order.push(trade.ticker.as_str());
            TickerTotals::default()
        });
        let added = match trade.action {
            TradeAction::Buy => entry.bought.add(trade),
            TradeAction::Sell => entry.sold.add(trade),
        };
        if !added {
            warn!(
                ticker = %trade.ticker,
                timestamp = %trade.timestamp,
                "Skipping trade: running totals would overflow"
            );
        }
    }

    let mut summary = PortfolioSummary::default();
    for ticker in order {
        let live_price = live_prices.get(ticker).copied().flatten();
        let position = totals[ticker].summarize(ticker, live_price);
        summary.total_realized_pnl = summary
            .total_realized_pnl
            .saturating_add(position.realized_pnl);
        summary.total_unrealized_pnl = summary
            .total_unrealized_pnl
            .saturating_add(position.unrealized_pnl);
        summary.positions.push(position);
    }
    summary
}
