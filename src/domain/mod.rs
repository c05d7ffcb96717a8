//! Core domain types and logic.

pub mod config_validation;
pub mod cycle;
pub mod error;
pub mod money;
pub mod position;
pub mod price;
pub mod refresh;
pub mod rsi;
pub mod signal;
pub mod trade;
pub mod watchlist;
