//! The order lifecycle transition table.
//!
//! `INITIALIZED -> SUBMITTED -> {REJECTED | ACCEPTED} -> {WORKING | TRIGGERED} ->
//! {PARTIALLY_FILLED -> ...} -> {FILLED | CANCELLED | EXPIRED}`. `INVALID` is reached
//! out-of-band (see [`super::order::Order::apply`]) on an integrity fault and is not
//! part of this table: an over-fill is not "an illegal trigger from this state", it is
//! a fault in an otherwise-legal trigger.

use std::collections::HashMap;

use crate::enums::OrderStatus;

/// The event kind that drives one edge of the order FSM. This mirrors
/// [`crate::events::OrderEventAny`] one-for-one, but stays a plain enum so the
/// table itself carries no event payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum OrderTrigger {
    Submitted,
    Rejected,
    Accepted,
    Working,
    Triggered,
    Modified,
    Cancelled,
    Expired,
    PartiallyFilled,
    Filled,
}

pub(crate) fn parse_status(status: OrderStatus) -> String {
    status.to_string()
}

pub(crate) fn parse_trigger(trigger: OrderTrigger) -> String {
    trigger.to_string()
}

/// Builds the `(state, trigger) -> state` table described in the component design.
#[must_use]
pub fn build_transition_table() -> HashMap<(OrderStatus, OrderTrigger), OrderStatus> {
    use OrderStatus::{
        Accepted, Cancelled, Expired, Filled, Initialized, PartiallyFilled, Rejected, Submitted,
        Triggered, Working,
    };
    use OrderTrigger as Tr;

    let mut table = HashMap::new();
    table.insert((Initialized, Tr::Submitted), Submitted);
    table.insert((Submitted, Tr::Rejected), Rejected);
    table.insert((Submitted, Tr::Accepted), Accepted);
    table.insert((Accepted, Tr::Working), Working);
    table.insert((Accepted, Tr::Cancelled), Cancelled);
    table.insert((Working, Tr::Modified), Working);
    table.insert((Triggered, Tr::Modified), Triggered);
    table.insert((Working, Tr::Cancelled), Cancelled);
    table.insert((Triggered, Tr::Cancelled), Cancelled);
    table.insert((Working, Tr::Expired), Expired);
    table.insert((Triggered, Tr::Expired), Expired);
    table.insert((Working, Tr::Triggered), Triggered);
    table.insert((Working, Tr::PartiallyFilled), PartiallyFilled);
    table.insert((PartiallyFilled, Tr::PartiallyFilled), PartiallyFilled);
    table.insert((Triggered, Tr::PartiallyFilled), PartiallyFilled);
    table.insert((Working, Tr::Filled), Filled);
    table.insert((PartiallyFilled, Tr::Filled), Filled);
    table.insert((Triggered, Tr::Filled), Filled);
    table
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_table_has_no_transitions_out_of_terminal_states() {
        let table = build_transition_table();
        for ((from, _), _) in &table {
            assert!(
                !from.is_terminal(),
                "table should not define a transition out of terminal state {from:?}"
            );
        }
    }
}
