use serde::{Deserialize, Serialize};

use super::macros::identifier;

identifier!(AccountId, "Identifies a venue account.");
