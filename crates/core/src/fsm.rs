//! A generic finite-state machine driven by a transition table.
//!
//! The order lifecycle (and nothing else in this crate) is expressed on top of this:
//! a table of `(state, trigger) -> state` maps, with unmapped pairs rejected rather
//! than panicking, since a bad trigger from a venue is an expected runtime occurrence
//! and not a programmer error.

use std::{collections::HashMap, fmt::Display, hash::Hash};

/// Error returned when a trigger has no mapped transition from the current state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid state transition: {current_state} -> {trigger}")]
pub struct InvalidStateTrigger {
    pub current_state: String,
    pub trigger: String,
}

/// A table-driven finite-state machine.
///
/// `S` is the state type and `T` is the trigger (event) type; both must be
/// hashable and copyable. `state_parser`/`trigger_parser` render states and
/// triggers for error messages and logs.
#[derive(Clone)]
pub struct FiniteStateMachine<S, T> {
    state: S,
    table: HashMap<(S, T), S>,
    state_parser: fn(S) -> String,
    trigger_parser: fn(T) -> String,
}

impl<S, T> FiniteStateMachine<S, T>
where
    S: Copy + Eq + Hash,
    T: Copy + Eq + Hash,
{
    /// Creates a new [`FiniteStateMachine`] with the given initial state and transition table.
    ///
    /// # Panics
    ///
    /// Panics if `table` is empty; a machine with no transitions is a construction bug,
    /// not a runtime condition.
    #[must_use]
    pub fn new(
        initial_state: S,
        table: HashMap<(S, T), S>,
        state_parser: fn(S) -> String,
        trigger_parser: fn(T) -> String,
    ) -> Self {
        assert!(!table.is_empty(), "FSM transition table cannot be empty");
        Self {
            state: initial_state,
            table,
            state_parser,
            trigger_parser,
        }
    }

    #[must_use]
    pub const fn state(&self) -> S {
        self.state
    }

    /// Applies `trigger` to the current state.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStateTrigger`] if there is no mapped transition from the
    /// current state for `trigger`. The state is left unchanged in that case.
    pub fn trigger(&mut self, trigger: T) -> Result<S, InvalidStateTrigger> {
        match self.table.get(&(self.state, trigger)) {
            Some(&next_state) => {
                self.state = next_state;
                Ok(next_state)
            }
            None => Err(InvalidStateTrigger {
                current_state: (self.state_parser)(self.state),
                trigger: (self.trigger_parser)(trigger),
            }),
        }
    }

    /// Returns whether `trigger` has a mapped transition from the current state.
    #[must_use]
    pub fn can_trigger(&self, trigger: T) -> bool {
        self.table.contains_key(&(self.state, trigger))
    }
}

impl<S: Display + Copy, T> std::fmt::Debug for FiniteStateMachine<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FiniteStateMachine")
            .field("state", &self.state.to_string())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum State {
        Idle,
        Running,
        Stopped,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Trigger {
        Start,
        Stop,
    }

    fn parse_state(s: State) -> String {
        format!("{s:?}")
    }

    fn parse_trigger(t: Trigger) -> String {
        format!("{t:?}")
    }

    #[fixture]
    fn table() -> HashMap<(State, Trigger), State> {
        let mut table = HashMap::new();
        table.insert((State::Idle, Trigger::Start), State::Running);
        table.insert((State::Running, Trigger::Stop), State::Stopped);
        table
    }

    #[fixture]
    fn fsm(table: HashMap<(State, Trigger), State>) -> FiniteStateMachine<State, Trigger> {
        FiniteStateMachine::new(State::Idle, table, parse_state, parse_trigger)
    }

    #[rstest]
    fn test_valid_transition_changes_state(mut fsm: FiniteStateMachine<State, Trigger>) {
        let next = fsm.trigger(Trigger::Start).unwrap();
        assert_eq!(next, State::Running);
        assert_eq!(fsm.state(), State::Running);
    }

    #[rstest]
    fn test_invalid_transition_leaves_state_unchanged(mut fsm: FiniteStateMachine<State, Trigger>) {
        let err = fsm.trigger(Trigger::Stop).unwrap_err();
        assert_eq!(err.current_state, "Idle");
        assert_eq!(err.trigger, "Stop");
        assert_eq!(fsm.state(), State::Idle);
    }

    #[rstest]
    fn test_can_trigger(fsm: FiniteStateMachine<State, Trigger>) {
        assert!(fsm.can_trigger(Trigger::Start));
        assert!(!fsm.can_trigger(Trigger::Stop));
    }

    #[rstest]
    #[should_panic(expected = "FSM transition table cannot be empty")]
    fn test_new_panics_on_empty_table() {
        let _ = FiniteStateMachine::<State, Trigger>::new(
            State::Idle,
            HashMap::new(),
            parse_state,
            parse_trigger,
        );
    }
}
