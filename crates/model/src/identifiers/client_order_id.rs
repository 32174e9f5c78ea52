use serde::{Deserialize, Serialize};

use super::macros::identifier;

identifier!(
    ClientOrderId,
    "Strategy-assigned order identifier, unique within a process lifetime."
);
