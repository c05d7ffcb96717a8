//! Plain-text dashboard tables for the terminal.

use crate::domain::cycle::{DashboardSnapshot, WatchlistRow};
use crate::domain::money::{format_money, format_optional_money, format_quantity};
use crate::domain::position::PortfolioSummary;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sections {
    #[default]
    All,
    Signals,
    Positions,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReportAdapter {
    sections: Sections,
}

impl ConsoleReportAdapter {
    pub fn new(sections: Sections) -> Self {
        Self { sections }
    }
}

fn rsi_text(row: &WatchlistRow) -> String {
    match (row.rsi, row.rsi_ok) {
        (Some(v), Some(true)) => format!("{:.1} ok", v),
        (Some(v), Some(false)) => format!("{:.1} low", v),
        (Some(v), None) => format!("{:.1}", v),
        (None, _) => "-".to_string(),
    }
}

fn write_signals(out: &mut String, rows: &[WatchlistRow]) {
    out.push_str("=== Watchlist Signals ===\n");
    if rows.is_empty() {
        out.push_str("(watchlist is empty)\n");
        return;
    }

    out.push_str(&format!(
        "{:<8} {:<10} {:>12} {:<12} {:<18} {:>10}\n",
        "Ticker", "Strategy", "Price", "Status", "Reason", "RSI"
    ));
    for row in rows {
        out.push_str(&format!(
            "{:<8} {:<10} {:>12} {:<12} {:<18} {:>10}\n",
            row.entry.ticker,
            row.entry.strategy.to_string(),
            format_optional_money(row.live_price),
            row.signal.status.to_string(),
            row.signal.reason.to_string(),
            rsi_text(row),
        ));
    }
}

fn write_positions(out: &mut String, portfolio: &PortfolioSummary) {
    out.push_str("=== Positions ===\n");
    if portfolio.positions.is_empty() {
        out.push_str("(no trades recorded)\n");
    } else {
        out.push_str(&format!(
            "{:<8} {:>10} {:>12} {:>12} {:>12} {:>12} {:>12}\n",
            "Ticker", "Open Qty", "Avg Buy", "Avg Sell", "Live", "Realized", "Unrealized"
        ));
        for position in &portfolio.positions {
            out.push_str(&format!(
                "{:<8} {:>10} {:>12} {:>12} {:>12} {:>12} {:>12}\n",
                position.ticker,
                format_quantity(position.open_quantity),
                format_money(position.avg_buy_price),
                format_money(position.avg_sell_price),
                format_optional_money(position.live_price),
                format_money(position.realized_pnl),
                format_money(position.unrealized_pnl),
            ));
        }
    }

    out.push_str(&format!(
        "Total Realized:   {:>12}\n",
        format_money(portfolio.total_realized_pnl)
    ));
    out.push_str(&format!(
        "Total Unrealized: {:>12}\n",
        format_money(portfolio.total_unrealized_pnl)
    ));
    out.push_str(&format!("Total PnL:        {:>12}\n", format_money(portfolio.total_pnl())));
}

impl ReportPort for ConsoleReportAdapter {
    fn render(&self, snapshot: &DashboardSnapshot) -> String {
        let mut out = String::new();

        for notice in &snapshot.notices {
            out.push_str(&format!("note: {}\n", notice));
        }
        if !snapshot.notices.is_empty() {
            out.push('\n');
        }

        match self.sections {
            Sections::All => {
                write_signals(&mut out, &snapshot.rows);
                out.push('\n');
                write_positions(&mut out, &snapshot.portfolio);
            }
            Sections::Signals => write_signals(&mut out, &snapshot.rows),
            Sections::Positions => write_positions(&mut out, &snapshot.portfolio),
        }

        out
    }
}
