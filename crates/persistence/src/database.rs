//! Postgres-backed [`ExecutionDatabase`] (§4.1).
//!
//! Grounded on the teacher's `PostgresCacheDatabase`
//! (`crates/infrastructure/src/sql/cache.rs`): an in-memory mirror answers every
//! synchronous read, and each write is handed to a background task over an
//! unbounded channel so `add_order`/`update_order`/`add_position` never block
//! the engine's single consumer task on network I/O. [`connect`](PostgresExecutionDatabase::connect)
//! performs the one blocking load this needs — every order, position, and
//! account as of the last successful write — before the engine calls
//! `orders_open` for the first time (§4.1's crash-recovery requirement).

use dashmap::DashMap;
use ironclad_execution::database::ExecutionDatabase;
use ironclad_model::{
    account::Account,
    events::AccountState,
    identifiers::{ClientOrderId, Security, StrategyId, Venue},
    orders::Order,
    position::Position,
};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    pg::{connect_pg, PostgresConnectOptions},
    queries::DatabaseQueries,
};

#[derive(Debug, Clone)]
enum WriteCommand {
    Order(Order),
    Position(Position),
    Account(Account),
}

/// The live, crash-recoverable [`ExecutionDatabase`].
pub struct PostgresExecutionDatabase {
    orders: DashMap<ClientOrderId, Order>,
    positions: DashMap<(StrategyId, Security), Position>,
    accounts: DashMap<Venue, Account>,
    tx: mpsc::UnboundedSender<WriteCommand>,
    _writer: JoinHandle<()>,
}

impl std::fmt::Debug for PostgresExecutionDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresExecutionDatabase")
            .field("orders", &self.orders.len())
            .field("positions", &self.positions.len())
            .field("accounts", &self.accounts.len())
            .finish_non_exhaustive()
    }
}

impl PostgresExecutionDatabase {
    /// Connects to Postgres, ensures the schema exists, and loads every
    /// resident order/position/account into the in-memory mirror.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection, schema creation, or initial load
    /// fails.
    pub async fn connect(options: PostgresConnectOptions) -> anyhow::Result<Self> {
        let pool = connect_pg(options.into()).await?;
        DatabaseQueries::ensure_schema(&pool).await?;

        let orders = DashMap::new();
        for order in DatabaseQueries::load_orders(&pool).await? {
            orders.insert(order.client_order_id, order);
        }
        let positions = DashMap::new();
        for position in DatabaseQueries::load_positions(&pool).await? {
            positions.insert((position.strategy_id, position.security), position);
        }
        let accounts = DashMap::new();
        for account in DatabaseQueries::load_accounts(&pool).await? {
            accounts.insert(account.venue, account);
        }

        tracing::info!(
            orders = orders.len(),
            positions = positions.len(),
            accounts = accounts.len(),
            "execution database recovered resident state"
        );

        let (tx, rx) = mpsc::unbounded_channel::<WriteCommand>();
        let writer = tokio::spawn(Self::run_writer(pool, rx));

        Ok(Self {
            orders,
            positions,
            accounts,
            tx,
            _writer: writer,
        })
    }

    async fn run_writer(pool: sqlx::PgPool, mut rx: mpsc::UnboundedReceiver<WriteCommand>) {
        while let Some(command) = rx.recv().await {
            let result = match &command {
                WriteCommand::Order(order) => DatabaseQueries::upsert_order(&pool, order).await,
                WriteCommand::Position(position) => DatabaseQueries::upsert_position(&pool, position).await,
                WriteCommand::Account(account) => DatabaseQueries::upsert_account(&pool, account).await,
            };
            if let Err(err) = result {
                tracing::error!(%err, "execution database write failed");
            }
        }
        tracing::debug!("execution database writer task stopped");
    }

    /// Queues `command` for the writer task. Never blocks; a write that
    /// outruns the writer simply waits in the channel.
    fn persist(&self, command: WriteCommand) {
        if self.tx.send(command).is_err() {
            tracing::error!("execution database writer task is gone; write dropped");
        }
    }
}

impl ExecutionDatabase for PostgresExecutionDatabase {
    fn add_order(&self, order: Order) {
        self.orders.insert(order.client_order_id, order.clone());
        self.persist(WriteCommand::Order(order));
    }

    fn update_order(&self, order: Order) {
        self.add_order(order);
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
            .insert((position.strategy_id, position.security), position.clone());
        self.persist(WriteCommand::Position(position));
    }

    fn update_position(&self, position: Position) {
        self.add_position(position);
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
        if let Some(account) = self.account(state.venue) {
            self.persist(WriteCommand::Account(account));
        }
    }

    fn account(&self, venue: Venue) -> Option<Account> {
        self.accounts.get(&venue).map(|e| e.value().clone())
    }

    /// Already loaded and filtered by `connect`; this just re-reads the
    /// mirror, same as [`ExecutionDatabase::orders_open`].
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
