//! Trading commands: what a strategy asks the engine to do. These share a
//! single enqueue point with [`crate::reports::ExecutionMessage`]'s event side
//! (§4.4) so that, e.g., a cancel submitted after an observed partial fill can
//! never be reordered ahead of that fill.

use ironclad_core::UUID4;
use ironclad_model::{
    enums::{OrderSide, OrderType, TimeInForce},
    identifiers::{ClientOrderId, Security, StrategyId, TraderId},
    types::{Price, Quantity},
};

/// Submits a new single order.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmitOrder {
    pub trader_id: TraderId,
    pub strategy_id: StrategyId,
    pub client_order_id: ClientOrderId,
    pub security: Security,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: Quantity,
    pub price: Option<Price>,
    pub time_in_force: TimeInForce,
    pub command_id: UUID4,
}

/// Submits an entry order plus its attached stop-loss and take-profit orders as
/// one logical unit. The client is responsible for any venue-side OCO linkage;
/// the engine treats this as three [`SubmitOrder`]s dispatched together.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmitBracketOrder {
    pub entry: SubmitOrder,
    pub stop_loss: SubmitOrder,
    pub take_profit: SubmitOrder,
}

/// Cancels a resting order by its strategy-assigned id.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CancelOrder {
    pub client_order_id: ClientOrderId,
    pub security: Security,
    pub command_id: UUID4,
}

/// Requests a quantity and/or price amendment on a resting order. Whether the
/// venue preserves queue position across the amendment is venue-specific and
/// not prescribed here.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModifyOrder {
    pub client_order_id: ClientOrderId,
    pub security: Security,
    pub quantity: Option<Quantity>,
    pub price: Option<Price>,
    pub command_id: UUID4,
}

/// Tagged union of every command a strategy can issue. Carries its own
/// [`Security`] so the engine can route it to `client[command.security.venue]`
/// without inspecting the variant's internals.
#[derive(Clone, Debug, PartialEq)]
pub enum TradingCommand {
    SubmitOrder(SubmitOrder),
    SubmitBracketOrder(SubmitBracketOrder),
    CancelOrder(CancelOrder),
    ModifyOrder(ModifyOrder),
}

impl TradingCommand {
    /// The security this command routes on. For a bracket order this is the
    /// entry leg's security — all three legs of a bracket must share a security.
    #[must_use]
    pub const fn security(&self) -> Security {
        match self {
            Self::SubmitOrder(c) => c.security,
            Self::SubmitBracketOrder(c) => c.entry.security,
            Self::CancelOrder(c) => c.security,
            Self::ModifyOrder(c) => c.security,
        }
    }

    /// The order this command acts on. For a bracket order this is the entry
    /// leg's id — a venue-side rejection of the entry is reported against it.
    #[must_use]
    pub const fn client_order_id(&self) -> ClientOrderId {
        match self {
            Self::SubmitOrder(c) => c.client_order_id,
            Self::SubmitBracketOrder(c) => c.entry.client_order_id,
            Self::CancelOrder(c) => c.client_order_id,
            Self::ModifyOrder(c) => c.client_order_id,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SubmitOrder(_) => "SubmitOrder",
            Self::SubmitBracketOrder(_) => "SubmitBracketOrder",
            Self::CancelOrder(_) => "CancelOrder",
            Self::ModifyOrder(_) => "ModifyOrder",
        }
    }
}

impl std::fmt::Display for TradingCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(security={})", self.name(), self.security())
    }
}
