use serde::{Deserialize, Serialize};

use super::macros::identifier;

identifier!(
    ExecutionId,
    "Identifier for a single fill event reported by a venue (also referred to as a trade match id)."
);
