use serde::{Deserialize, Serialize};

use super::macros::identifier;

identifier!(PositionId, "Identifies a position keyed by (strategy_id, security).");
