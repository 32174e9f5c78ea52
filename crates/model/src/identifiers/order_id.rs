use serde::{Deserialize, Serialize};

use super::macros::identifier;

identifier!(OrderId, "Venue-assigned order identifier, bound on acceptance.");
