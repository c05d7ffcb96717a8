//! Port traits between the domain and its data sources and renderers.

pub mod config_port;
pub mod price_port;
pub mod report_port;
pub mod trade_log_port;
pub mod watchlist_port;
