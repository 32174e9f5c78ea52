//! Position lifecycle events, published by the engine (never by a client) as a
//! side effect of applying an `OrderFilled`/`OrderPartiallyFilled` event.

use ironclad_core::{UnixNanos, UUID4};
use serde::{Deserialize, Serialize};

use crate::{
    enums::PositionSide,
    identifiers::{PositionId, Security, StrategyId},
    types::{Money, Price, Quantity},
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionOpened {
    pub position_id: PositionId,
    pub strategy_id: StrategyId,
    pub security: Security,
    pub side: PositionSide,
    pub quantity: Quantity,
    pub avg_px: Price,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionChanged {
    pub position_id: PositionId,
    pub strategy_id: StrategyId,
    pub security: Security,
    pub side: PositionSide,
    pub quantity: Quantity,
    pub avg_px: Price,
    pub realized_pnl: Money,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionClosed {
    pub position_id: PositionId,
    pub strategy_id: StrategyId,
    pub security: Security,
    pub realized_pnl: Money,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PositionEventAny {
    Opened(PositionOpened),
    Changed(PositionChanged),
    Closed(PositionClosed),
}

impl PositionEventAny {
    #[must_use]
    pub const fn position_id(&self) -> PositionId {
        match self {
            Self::Opened(e) => e.position_id,
            Self::Changed(e) => e.position_id,
            Self::Closed(e) => e.position_id,
        }
    }
}
