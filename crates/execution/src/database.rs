//! The execution database (§4.1): the sole writer of authoritative order,
//! position, and account state. The engine's consumer task is the only caller
//! that ever mutates through this trait; other tasks read through the same
//! façade and see a consistent snapshot by copy (§5).
//!
//! [`InMemoryExecutionDatabase`] is the backtest implementation. The live,
//! crash-recoverable implementation lives in `ironclad-persistence` and
//! implements this same trait against Postgres.

use std::sync::Arc;

use dashmap::DashMap;
use ironclad_model::{
    account::Account,
    events::AccountState,
    identifiers::{AccountId, ClientOrderId, Security, StrategyId, Venue},
    orders::Order,
    position::Position,
};

/// The authoritative store of orders, positions, and accounts (§4.1).
///
/// All methods take `&self`: implementations provide their own interior
/// mutability (a lock or a concurrent map) so that the single consumer task
/// can write while other tasks (reporting, reconciliation) read a snapshot by
/// copy, per §5's shared-read/exclusive-write discipline.
pub trait ExecutionDatabase: Send + Sync {
    fn add_order(&self, order: Order);

    /// Replaces the stored order with `order`, which must already carry the
    /// same `client_order_id`. Used after the engine applies an event to its
    /// working copy and needs to persist the result.
    fn update_order(&self, order: Order);

    fn order(&self, client_order_id: ClientOrderId) -> Option<Order>;

    fn orders(&self) -> Vec<Order>;

    /// Every order not in a terminal FSM state.
    fn orders_open(&self) -> Vec<Order>;

    fn add_position(&self, position: Position);

    fn update_position(&self, position: Position);

    fn position(&self, strategy_id: StrategyId, security: Security) -> Option<Position>;

    fn positions(&self) -> Vec<Position>;

    fn update_account(&self, state: &AccountState);

    fn account(&self, venue: Venue) -> Option<Account>;

    /// Called once on engine start: every order not in a terminal state at the
    /// time of the last successful write (§4.1 crash-recovery requirement).
    fn load_orders(&self) -> Vec<Order>;

    fn load_positions(&self) -> Vec<Position>;

    fn load_accounts(&self) -> Vec<Account>;
}

/// In-memory [`ExecutionDatabase`], used for backtests and as the default
/// store before a persistent backend is attached. `load_*` simply returns
/// whatever is currently resident — there is no crash to recover from.
#[derive(Debug, Default)]
pub struct InMemoryExecutionDatabase {
    orders: DashMap<ClientOrderId, Order>,
    positions: DashMap<(StrategyId, Security), Position>,
    accounts: DashMap<Venue, Account>,
}

impl InMemoryExecutionDatabase {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl ExecutionDatabase for InMemoryExecutionDatabase {
    fn add_order(&self, order: Order) {
        self.orders.insert(order.client_order_id, order);
    }

    fn update_order(&self, order: Order) {
        self.orders.insert(order.client_order_id, order);
    }

    fn order(&self, client_order_id: ClientOrderId) -> Option<Order> {
        self.orders.get(&client_order_id).map(|e| e.value().clone())
    }

    fn orders(&self) -> Vec<Order> {
        self.orders.iter().map(|e| e.value().clone()).collect()
    }

    fn orders_open(&self) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|e| !e.value().is_closed())
            .map(|e| e.value().clone())
            .collect()
    }

    fn add_position(&self, position: Position) {
        self.positions
            .insert((position.strategy_id, position.security), position);
    }

    fn update_position(&self, position: Position) {
        self.positions
            .insert((position.strategy_id, position.security), position);
    }

    fn position(&self, strategy_id: StrategyId, security: Security) -> Option<Position> {
        self.positions
            .get(&(strategy_id, security))
            .map(|e| e.value().clone())
    }

    fn positions(&self) -> Vec<Position> {
        self.positions.iter().map(|e| e.value().clone()).collect()
    }

    fn update_account(&self, state: &AccountState) {
        self.accounts
            .entry(state.venue)
            .and_modify(|acc| acc.apply_state(state))
            .or_insert_with(|| Account::from_state(state));
    }

    fn account(&self, venue: Venue) -> Option<Account> {
        self.accounts.get(&venue).map(|e| e.value().clone())
    }

    fn load_orders(&self) -> Vec<Order> {
        self.orders_open()
    }

    fn load_positions(&self) -> Vec<Position> {
        self.positions()
    }

    fn load_accounts(&self) -> Vec<Account> {
        self.accounts.iter().map(|e| e.value().clone()).collect()
    }
}

/// Distinguishes a missing account lookup key from a genuinely-absent account;
/// kept for call sites that need to report *which* account id was requested.
#[must_use]
pub fn account_id_for(database: &dyn ExecutionDatabase, venue: Venue) -> Option<AccountId> {
    database.account(venue).map(|a| a.account_id)
}

#[cfg(test)]
mod tests {
    use ironclad_core::UnixNanos;
    use ironclad_model::{
        enums::{AssetClass, AssetType, OrderSide, OrderType, TimeInForce},
        identifiers::{Security, TraderId},
        types::{Currency, Money, Price, Quantity},
    };
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    fn security() -> Security {
        Security::new("BTCUSDT", "COINBASE", AssetClass::Crypto, AssetType::Spot)
    }

    fn order() -> Order {
        Order::new(
            ClientOrderId::new("O-1"),
            TraderId::default(),
            StrategyId::default(),
            security(),
            OrderSide::Buy,
            OrderType::Limit,
            Quantity::new(dec!(10), 0),
            Some(Price::new(dec!(100), 0)),
            TimeInForce::Gtc,
            None,
            UnixNanos::default(),
        )
    }

    #[rstest]
    fn test_add_then_read_order() {
        let db = InMemoryExecutionDatabase::new();
        let order = order();
        let id = order.client_order_id;
        db.add_order(order);
        assert!(db.order(id).is_some());
        assert_eq!(db.orders_open().len(), 1);
    }

    #[rstest]
    fn test_update_account_creates_then_applies() {
        let db = InMemoryExecutionDatabase::new();
        let venue = Venue::new("COINBASE");
        let state = AccountState {
            account_id: AccountId::new("ACC-1"),
            venue,
            balance: Money::new(dec!(1000), Currency::usdt()),
            margin_used: Money::zero(Currency::usdt()),
            margin_free: Money::new(dec!(1000), Currency::usdt()),
            margin_call: false,
            event_id: ironclad_core::UUID4::new(),
            ts_event: UnixNanos::default(),
        };
        db.update_account(&state);
        let account = db.account(venue).unwrap();
        assert_eq!(account.balance.raw(), dec!(1000));
    }

    #[rstest]
    fn test_load_orders_returns_only_open() {
        let db = InMemoryExecutionDatabase::new();
        let mut filled = order();
        filled.client_order_id = ClientOrderId::new("O-2");
        db.add_order(order());
        db.add_order(filled);
        assert_eq!(db.load_orders().len(), 2);
    }
}
