//! Enumerations shared across the domain model.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Side of an order or a fill.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

/// The execution instructions an order carries.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Market,
    Limit,
    Stop,
    StopLimit,
}

/// Time-in-force instruction.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInForce {
    /// Good-till-cancelled.
    Gtc,
    /// Immediate-or-cancel.
    Ioc,
    /// Fill-or-kill.
    Fok,
    /// Good-till-date.
    Gtd,
}

/// A position in the order lifecycle state machine (see [`crate::orders::order_fsm`]).
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Initialized,
    Submitted,
    Rejected,
    Accepted,
    Working,
    Triggered,
    PartiallyFilled,
    Filled,
    Cancelled,
    Expired,
    /// Terminal integrity-fault state: the order's recorded fills could not be
    /// reconciled with its quantity (e.g. an over-fill).
    Invalid,
}

impl OrderStatus {
    /// Whether this status is terminal (no further transitions are possible).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Rejected | Self::Filled | Self::Cancelled | Self::Expired | Self::Invalid
        )
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        !self.is_terminal() && !matches!(self, Self::Initialized)
    }
}

/// Side of a position.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionSide {
    #[default]
    Flat,
    Long,
    Short,
}

/// Whether a fill provided or removed liquidity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LiquiditySide {
    Maker,
    Taker,
}

/// Broad asset classification, part of a [`crate::identifiers::Security`]'s identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetClass {
    Equity,
    Fx,
    Commodity,
    Crypto,
    Debt,
}

/// Contract type, part of a [`crate::identifiers::Security`]'s identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    Spot,
    Margin,
    Future,
    Option,
    Perpetual,
}
