//! The order entity and the finite-state machine that drives its lifecycle.

pub mod fsm;
pub mod order;

pub use fsm::OrderTrigger;
pub use order::{Fill, Order, OrderError};
