use serde::{Deserialize, Serialize};

use super::macros::identifier;

identifier!(Venue, "A trading counterparty or exchange; namespace for `OrderId`.");

impl Default for Venue {
    fn default() -> Self {
        Self::new("SIM")
    }
}
