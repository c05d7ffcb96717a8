//! Price provider port trait.

use crate::domain::error::SentinelError;
use crate::domain::price::PriceBar;
use rust_decimal::Decimal;

pub trait PricePort {
    /// Latest known price, `Ok(None)` when the provider has nothing for the ticker.
    fn latest_price(&self, ticker: &str) -> Result<Option<Decimal>, SentinelError>;

    /// Up to `bars` most recent daily closes, oldest first.
    fn price_history(&self, ticker: &str, bars: usize) -> Result<Vec<PriceBar>, SentinelError>;
}
