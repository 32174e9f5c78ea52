//! The live execution database: a Postgres-backed [`ExecutionDatabase`]
//! implementation satisfying §4.1's crash-recovery requirement — every order
//! not in a terminal state at the time of the last successful write survives a
//! process restart and is handed back to the engine before reconciliation runs.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]

mod database;
mod pg;
mod queries;

pub use database::PostgresExecutionDatabase;
pub use ironclad_execution::database::ExecutionDatabase;
pub use pg::{connect_pg, get_postgres_connect_options, PostgresConnectOptions};
