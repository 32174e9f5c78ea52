use serde::{Deserialize, Serialize};

use super::macros::identifier;

identifier!(TraderId, "Identifies the trader instance that owns a strategy's orders.");

impl Default for TraderId {
    fn default() -> Self {
        Self::new("TRADER-001")
    }
}
