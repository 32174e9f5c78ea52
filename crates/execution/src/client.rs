//! The execution client capability set (§4.3, §6): what the engine requires of
//! a venue adapter. The client owns ID translation, wire encoding, and
//! reconnect; it never mutates an `Order` directly — it only ever produces the
//! canonical events in §4.2 by calling back into the engine.

use async_trait::async_trait;
use ironclad_model::identifiers::{OrderId, Venue};
use thiserror::Error;

use crate::{
    commands::{CancelOrder, ModifyOrder, SubmitBracketOrder, SubmitOrder},
    reports::ExecutionStateReport,
};

/// Errors a client's boundary methods can raise. Per §7, these are *transport*
/// errors — the engine's response is to keep accepting commands for other
/// venues while answering this venue's commands with a rejection event, never
/// to crash the consumer loop.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionClientError {
    #[error("venue {venue} unreachable: {reason}")]
    Disconnected { venue: Venue, reason: String },
    #[error("venue {venue} timed out: {reason}")]
    Timeout { venue: Venue, reason: String },
    #[error("venue {venue} rejected request: {reason}")]
    Rejected { venue: Venue, reason: String },
}

/// A venue adapter, registered with the engine keyed by [`Venue`] (§4.3).
///
/// Implementations are responsible for translating [`SubmitOrder`] etc. into
/// venue wire calls and for surfacing the venue's responses as
/// [`ironclad_model::events::OrderEventAny`] by calling back into
/// [`crate::engine::ExecutionEngine::process`] — never by returning an event
/// from these methods, which only report transport-level success or failure.
#[async_trait]
pub trait ExecutionClient: Send + Sync {
    /// The venue this client serves. Used as the routing key by the engine.
    fn venue(&self) -> Venue;

    /// Whether the client currently believes it has a live venue connection.
    fn is_connected(&self) -> bool;

    async fn connect(&self) -> Result<(), ExecutionClientError>;

    async fn disconnect(&self) -> Result<(), ExecutionClientError>;

    async fn submit_order(&self, command: SubmitOrder) -> Result<(), ExecutionClientError>;

    async fn submit_bracket_order(
        &self,
        command: SubmitBracketOrder,
    ) -> Result<(), ExecutionClientError>;

    async fn cancel_order(&self, command: CancelOrder) -> Result<(), ExecutionClientError>;

    async fn modify_order(&self, command: ModifyOrder) -> Result<(), ExecutionClientError>;

    /// Requests the venue's ground-truth state for exactly the given order ids.
    /// Live-only; a backtest client may return an empty report unconditionally.
    async fn state_report(
        &self,
        order_ids: &[OrderId],
    ) -> Result<ExecutionStateReport, ExecutionClientError>;
}
