//! Table formatting for dashboard reports.
//!
//! Provides functions to generate Typst markup for:
//! - Watchlist signal table, rows filled by signal status
//! - Positions table and PnL totals
//! - Trade log table
//! - Notices list

use rust_decimal::Decimal;

use crate::domain::cycle::{Notice, WatchlistRow};
use crate::domain::money::{format_money, format_optional_money, format_quantity};
use crate::domain::position::PortfolioSummary;
use crate::domain::signal::SignalStatus;
use crate::domain::trade::TradeRecord;

/// Escape characters that Typst treats as markup inside content blocks.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '[' | ']' | '#' | '$' | '*' | '_' | '`' | '<' | '>' | '@' | '"'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Typst fill colour for a signal status.
fn status_fill(status: SignalStatus) -> &'static str {
    match status {
        SignalStatus::Favorable => "rgb(\"#C8F7C5\")",
        SignalStatus::Unfavorable => "rgb(\"#F7C5C5\")",
        SignalStatus::Neutral => "rgb(\"#EEEEEE\")",
    }
}

fn pnl_cell(value: Decimal) -> String {
    let color = if value >= Decimal::ZERO { "green" } else { "red" };
    format!("text(fill: {}, [{}])", color, format_money(value))
}

fn rsi_cell(rsi: Option<f64>, rsi_ok: Option<bool>) -> String {
    match (rsi, rsi_ok) {
        (Some(v), Some(true)) => format!("[{:.1} ok]", v),
        (Some(v), Some(false)) => format!("[{:.1} low]", v),
        (Some(v), None) => format!("[{:.1}]", v),
        (None, _) => "[-]".to_string(),
    }
}

pub fn format_watchlist_table(rows: &[WatchlistRow]) -> String {
    if rows.is_empty() {
        return "_Watchlist is empty._\n".to_string();
    }

    let mut output = String::new();
    output.push_str("#table(\n");
    output.push_str("  columns: 6,\n");
    output.push_str("  align: (left, left, right, left, left, right),\n");
    output.push_str("  [*Ticker*], [*Strategy*], [*Price*], [*Status*], [*Reason*], [*RSI*],\n");

    for row in rows {
        let fill = status_fill(row.signal.status);
        output.push_str(&format!(
            "  [{}], [{}], [{}], table.cell(fill: {}, [{}]), [{}], {},\n",
            escape(&row.entry.ticker),
            escape(&row.entry.strategy.to_string()),
            format_optional_money(row.live_price),
            fill,
            row.signal.status,
            row.signal.reason,
            rsi_cell(row.rsi, row.rsi_ok),
        ));
    }

    output.push_str(")\n");
    output
}

pub fn format_positions_table(portfolio: &PortfolioSummary) -> String {
    if portfolio.positions.is_empty() {
        return "_No positions._\n".to_string();
    }

    let mut output = String::new();
    output.push_str("#table(\n");
    output.push_str("  columns: 7,\n");
    output.push_str("  align: (left, right, right, right, right, right, right),\n");
    output.push_str("  [*Ticker*], [*Open Qty*], [*Avg Buy*], [*Avg Sell*], [*Live*], ");
    output.push_str("[*Realized*], [*Unrealized*],\n");

    for position in &portfolio.positions {
        output.push_str(&format!(
            "  [{}], [{}], [{}], [{}], [{}], {}, {},\n",
            escape(&position.ticker),
            format_quantity(position.open_quantity),
            format_money(position.avg_buy_price),
            format_money(position.avg_sell_price),
            format_optional_money(position.live_price),
            pnl_cell(position.realized_pnl),
            pnl_cell(position.unrealized_pnl),
        ));
    }

    output.push_str(")\n");
    output
}

pub fn format_pnl_totals(portfolio: &PortfolioSummary) -> String {
    let mut output = String::new();
    output.push_str("#table(\n");
    output.push_str("  columns: 2,\n");
    output.push_str("  align: (left, right),\n");
    output.push_str(&format!(
        "  [Total Realized PnL], {},\n",
        pnl_cell(portfolio.total_realized_pnl)
    ));
    output.push_str(&format!(
        "  [Total Unrealized PnL], {},\n",
        pnl_cell(portfolio.total_unrealized_pnl)
    ));
    output.push_str(&format!("  [*Total PnL*], {},\n", pnl_cell(portfolio.total_pnl())));
    output.push_str(")\n");
    output
}

/// Trade log, most recent first.
pub fn format_trade_log(trades: &[TradeRecord]) -> String {
    if trades.is_empty() {
        return "_No trades recorded._\n".to_string();
    }

    let mut output = String::new();
    output.push_str("#table(\n");
    output.push_str("  columns: 5,\n");
    output.push_str("  [*Time*], [*Ticker*], [*Action*], [*Price*], [*Qty*],\n");

    for trade in trades.iter().rev() {
        output.push_str(&format!(
            "  [{}], [{}], [{}], [{}], [{}],\n",
            escape(&trade.timestamp),
            escape(&trade.ticker),
            trade.action,
            format_money(trade.price),
            format_quantity(trade.quantity),
        ));
    }

    output.push_str(")\n");
    output
}

pub fn format_notices(notices: &[Notice]) -> String {
    notices
        .iter()
        .map(|n| format!("- {}\n", escape(&n.to_string())))
        .collect()
}
