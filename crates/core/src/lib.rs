//! Foundational types used throughout the Ironclad execution engine: a UUIDv4 wrapper,
//! a nanosecond timestamp newtype, correctness-check helpers, and a generic finite-state
//! machine that the order and reconciliation layers build on.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]

pub mod correctness;
pub mod fsm;
pub mod nanos;
pub mod uuid;

pub use fsm::{FiniteStateMachine, InvalidStateTrigger};
pub use nanos::UnixNanos;
pub use uuid::UUID4;
