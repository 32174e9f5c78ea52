//! Account state events, emitted by an execution client whenever the venue's
//! balance/margin view changes.

use ironclad_core::{UnixNanos, UUID4};
use serde::{Deserialize, Serialize};

use crate::identifiers::{AccountId, Venue};
use crate::types::Money;

/// A point-in-time snapshot of a venue account's balance and margin state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountState {
    pub account_id: AccountId,
    pub venue: Venue,
    pub balance: Money,
    pub margin_used: Money,
    pub margin_free: Money,
    pub margin_call: bool,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
}
