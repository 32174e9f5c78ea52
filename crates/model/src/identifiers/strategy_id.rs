use serde::{Deserialize, Serialize};

use super::macros::identifier;

identifier!(StrategyId, "Identifies the strategy that owns an order or position.");

impl Default for StrategyId {
    fn default() -> Self {
        Self::new("S-001")
    }
}
