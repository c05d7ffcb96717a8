//! Watchlist source port trait.

use crate::domain::error::SentinelError;
use crate::domain::watchlist::WatchlistEntry;

pub trait WatchlistPort {
    /// Read the current watchlist. Rows without a ticker are dropped.
    fn load_watchlist(&self) -> Result<Vec<WatchlistEntry>, SentinelError>;
}
