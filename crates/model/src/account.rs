//! [`Account`]: per-venue balance and margin state, updated by [`AccountState`] events.

use ironclad_core::UnixNanos;
use serde::{Deserialize, Serialize};

use crate::{
    events::AccountState,
    identifiers::{AccountId, Venue},
    types::Money,
};

/// Per-venue account state, updated wholesale each time the client reports a new
/// [`AccountState`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: AccountId,
    pub venue: Venue,
    pub balance: Money,
    pub margin_used: Money,
    pub margin_free: Money,
    pub margin_call: bool,
    pub ts_last: UnixNanos,
}

impl Account {
    #[must_use]
    pub fn from_state(state: &AccountState) -> Self {
        Self {
            account_id: state.account_id,
            venue: state.venue,
            balance: state.balance,
            margin_used: state.margin_used,
            margin_free: state.margin_free,
            margin_call: state.margin_call,
            ts_last: state.ts_event,
        }
    }

    pub fn apply_state(&mut self, state: &AccountState) {
        self.balance = state.balance;
        self.margin_used = state.margin_used;
        self.margin_free = state.margin_free;
        self.margin_call = state.margin_call;
        self.ts_last = state.ts_event;
    }
}
