//! Ambient stack shared by every live/backtest component: time, logging, id
//! generation, and configuration. None of this is domain logic — it is the
//! scaffolding the execution engine and reconciliation protocol are built on.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]

pub mod clock;
pub mod config;
pub mod generators;
pub mod logging;

pub use clock::{Clock, LiveClock, TestClock};
pub use config::{EngineConfig, ReconciliationConfig};
