//! The execution engine and venue-reconciliation protocol: the single writer
//! of order state, the capability contract every venue adapter must satisfy,
//! and the convergence loop that keeps the two honest after a reconnect.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]

pub mod client;
pub mod commands;
pub mod database;
pub mod engine;
pub mod reconciliation;
pub mod reports;

pub use client::{ExecutionClient, ExecutionClientError};
pub use commands::{CancelOrder, ModifyOrder, SubmitBracketOrder, SubmitOrder, TradingCommand};
pub use database::{ExecutionDatabase, InMemoryExecutionDatabase};
pub use engine::{EngineError, EngineState, EventSink, ExecutionEngine, NullEventSink};
pub use reports::{ExecutionStateReport, OrderStatusReport};
