//! Trade log source port trait.

use crate::domain::error::SentinelError;
use crate::domain::trade::TradeRecord;

pub trait TradeLogPort {
    /// Read every logged fill in file order. A log that does not exist yet
    /// is an empty sequence, not an error.
    fn load_trades(&self) -> Result<Vec<TradeRecord>, SentinelError>;
}
