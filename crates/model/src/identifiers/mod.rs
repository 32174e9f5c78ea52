//! Typed identifiers. Each is a thin `Ustr`-backed newtype so that cloning and
//! hashing an identifier is cheap regardless of how many orders or positions
//! reference it.

mod macros;

mod account_id;
mod client_order_id;
mod execution_id;
mod order_id;
mod position_id;
mod security;
mod strategy_id;
mod trader_id;
mod venue;

pub use account_id::AccountId;
pub use client_order_id::ClientOrderId;
pub use execution_id::ExecutionId;
pub use order_id::OrderId;
pub use position_id::PositionId;
pub use security::Security;
pub use strategy_id::StrategyId;
pub use trader_id::TraderId;
pub use venue::Venue;
