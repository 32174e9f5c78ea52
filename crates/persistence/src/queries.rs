//! Table-scoped static query methods (§4.1), grounded on the teacher's
//! `DatabaseQueries` (`crates/infrastructure/src/sql/queries.rs`): one method per
//! table operation, all taking `pool: &PgPool` as the first argument.
//!
//! `Order` can't derive `Serialize` directly (its FSM field isn't serializable),
//! so [`PersistedOrder`] carries exactly the fields [`Order::restore`] needs and
//! round-trips through it. `Position` and `Account` already derive
//! `Serialize`/`Deserialize` and are stored as-is.

use ironclad_model::{
    account::Account,
    enums::{OrderSide, OrderStatus, OrderType, TimeInForce},
    identifiers::{ClientOrderId, OrderId, Security, StrategyId, TraderId},
    orders::{Fill, Order},
    position::Position,
    types::{Money, Price, Quantity},
};
use ironclad_core::UnixNanos;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, PgPool};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PersistedOrder {
    client_order_id: ClientOrderId,
    order_id: Option<OrderId>,
    trader_id: TraderId,
    strategy_id: StrategyId,
    security: Security,
    side: OrderSide,
    order_type: OrderType,
    quantity: Quantity,
    price: Option<Price>,
    time_in_force: TimeInForce,
    expire_time: Option<UnixNanos>,
    status: OrderStatus,
    filled_qty: Quantity,
    leaves_qty: Quantity,
    avg_price: Option<Price>,
    commission: Option<Money>,
    fills: Vec<Fill>,
    reject_reason: Option<String>,
    cancel_reason: Option<String>,
    ts_last: UnixNanos,
}

impl PersistedOrder {
    pub(crate) fn from_order(order: &Order) -> Self {
        Self {
            client_order_id: order.client_order_id,
            order_id: order.order_id,
            trader_id: order.trader_id,
            strategy_id: order.strategy_id,
            security: order.security,
            side: order.side,
            order_type: order.order_type,
            quantity: order.quantity,
            price: order.price,
            time_in_force: order.time_in_force,
            expire_time: order.expire_time,
            status: order.status(),
            filled_qty: order.filled_qty,
            leaves_qty: order.leaves_qty,
            avg_price: order.avg_price,
            commission: order.commission,
            fills: order.fills.clone(),
            reject_reason: order.reject_reason.clone(),
            cancel_reason: order.cancel_reason.clone(),
            ts_last: order.ts_last,
        }
    }

    pub(crate) fn into_order(self) -> Order {
        Order::restore(
            self.client_order_id,
            self.order_id,
            self.trader_id,
            self.strategy_id,
            self.security,
            self.side,
            self.order_type,
            self.quantity,
            self.price,
            self.time_in_force,
            self.expire_time,
            self.status,
            self.filled_qty,
            self.leaves_qty,
            self.avg_price,
            self.commission,
            self.fills,
            self.reject_reason,
            self.cancel_reason,
            self.ts_last,
        )
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    state: Json<PersistedOrder>,
}

#[derive(sqlx::FromRow)]
struct PositionRow {
    state: Json<Position>,
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    state: Json<Account>,
}

#[derive(Debug)]
pub struct DatabaseQueries;

impl DatabaseQueries {
    /// Creates the three tables this database needs if they don't already
    /// exist. Run once by [`crate::database::PostgresExecutionDatabase::connect`];
    /// idempotent so a restart against an already-provisioned database is a
    /// no-op.
    pub async fn ensure_schema(pool: &PgPool) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS orders (
                 client_order_id TEXT PRIMARY KEY,
                 state JSONB NOT NULL
             )",
        )
        .execute(pool)
        .await
        .map_err(|e| anyhow::anyhow!("failed to create orders table: {e}"))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS positions (
                 strategy_id TEXT NOT NULL,
                 security TEXT NOT NULL,
                 state JSONB NOT NULL,
                 PRIMARY KEY (strategy_id, security)
             )",
        )
        .execute(pool)
        .await
        .map_err(|e| anyhow::anyhow!("failed to create positions table: {e}"))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS accounts (
                 venue TEXT PRIMARY KEY,
                 state JSONB NOT NULL
             )",
        )
        .execute(pool)
        .await
        .map_err(|e| anyhow::anyhow!("failed to create accounts table: {e}"))?;

        Ok(())
    }

    pub async fn upsert_order(pool: &PgPool, order: &Order) -> anyhow::Result<()> {
        let snapshot = PersistedOrder::from_order(order);
        sqlx::query(
            "INSERT INTO orders (client_order_id, state) VALUES ($1, $2)
             ON CONFLICT (client_order_id) DO UPDATE SET state = EXCLUDED.state",
        )
        .bind(order.client_order_id.as_str())
        .bind(Json(snapshot))
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!("failed to upsert order {}: {e}", order.client_order_id))
    }

    pub async fn load_orders(pool: &PgPool) -> anyhow::Result<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>("SELECT state FROM orders")
            .fetch_all(pool)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load orders: {e}"))?;
        Ok(rows.into_iter().map(|row| row.state.0.into_order()).collect())
    }

    pub async fn upsert_position(pool: &PgPool, position: &Position) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO positions (strategy_id, security, state) VALUES ($1, $2, $3)
             ON CONFLICT (strategy_id, security) DO UPDATE SET state = EXCLUDED.state",
        )
        .bind(position.strategy_id.as_str())
        .bind(position.security.to_string())
        .bind(Json(position.clone()))
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!("failed to upsert position: {e}"))
    }

    pub async fn load_positions(pool: &PgPool) -> anyhow::Result<Vec<Position>> {
        let rows = sqlx::query_as::<_, PositionRow>("SELECT state FROM positions")
            .fetch_all(pool)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load positions: {e}"))?;
        Ok(rows.into_iter().map(|row| row.state.0).collect())
    }

    pub async fn upsert_account(pool: &PgPool, account: &Account) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO accounts (venue, state) VALUES ($1, $2)
             ON CONFLICT (venue) DO UPDATE SET state = EXCLUDED.state",
        )
        .bind(account.venue.as_str())
        .bind(Json(account.clone()))
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!("failed to upsert account: {e}"))
    }

    pub async fn load_accounts(pool: &PgPool) -> anyhow::Result<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountRow>("SELECT state FROM accounts")
            .fetch_all(pool)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load accounts: {e}"))?;
        Ok(rows.into_iter().map(|row| row.state.0).collect())
    }
}

#[cfg(test)]
mod tests {
    use ironclad_core::UnixNanos;
    use ironclad_model::{
        enums::{AssetClass, AssetType},
        identifiers::{ClientOrderId, Security, StrategyId, TraderId},
        types::Quantity,
    };
    use rust_decimal_macros::dec;

    use super::*;

    fn order() -> Order {
        Order::new(
            ClientOrderId::new("O-1"),
            TraderId::default(),
            StrategyId::default(),
            Security::new("BTCUSDT", "COINBASE", AssetClass::Crypto, AssetType::Spot),
            OrderSide::Buy,
            OrderType::Limit,
            Quantity::new(dec!(10), 0),
            Some(Price::new(dec!(100), 0)),
            TimeInForce::Gtc,
            None,
            UnixNanos::default(),
        )
    }

    #[test]
    fn test_persisted_order_round_trips_through_json() {
        let original = order();
        let snapshot = PersistedOrder::from_order(&original);
        let json = serde_json::to_string(&snapshot).expect("serialize");
        let decoded: PersistedOrder = serde_json::from_str(&json).expect("deserialize");
        let restored = decoded.into_order();

        assert_eq!(restored.client_order_id, original.client_order_id);
        assert_eq!(restored.status(), original.status());
        assert_eq!(restored.quantity.raw(), original.quantity.raw());
    }
}
