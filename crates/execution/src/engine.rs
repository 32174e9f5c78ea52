//! The execution engine (§4.4): single-consumer dispatch loop over a bounded
//! command/event queue, the FSM driver, and the entry point for the
//! reconciliation protocol.

use std::{
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc,
    },
    time::Duration,
};

use dashmap::DashMap;
use ironclad_common::{
    config::EngineConfig,
    logging::{CMD, EVT, RECV},
};
use ironclad_core::{UnixNanos, UUID4};
use ironclad_model::{
    events::{order::OrderRejected, AccountState, OrderEventAny},
    identifiers::Venue,
    orders::OrderError,
};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::{
    client::ExecutionClient,
    commands::TradingCommand,
    database::ExecutionDatabase,
    reconciliation::reconcile_state,
};

/// Either a trading command or an order event — the engine's single queue
/// carries both, plus the shutdown sentinel (§4.4, §9 "Sentinel-null
/// messages"). Only [`ExecutionEngine::stop`] may produce the `Shutdown`
/// variant; `execute`/`process` cannot construct it.
#[derive(Clone, Debug)]
enum EngineMessage {
    Command(TradingCommand),
    Event(OrderEventAny),
    Account(AccountState),
    Shutdown,
}

/// Something that wants to observe every event the engine applies, in the
/// order the engine applied it. The portfolio projection (§4.6) is the
/// canonical implementer; defined here rather than depending on the portfolio
/// crate, so `ironclad-execution` has no dependency on `ironclad-portfolio`.
pub trait EventSink: Send + Sync {
    fn process_event(&self, event: &OrderEventAny);

    /// Forwards a client-reported `AccountState` (§3 Account). The database's
    /// own `update_account` is always applied first, regardless of this hook,
    /// so an account's balance is durable even with no portfolio wired up.
    fn process_account(&self, state: &AccountState);
}

/// A sink that drops everything, used where no portfolio is wired up (unit
/// tests, a pure execution-only deployment).
#[derive(Debug, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn process_event(&self, _event: &OrderEventAny) {}
    fn process_account(&self, _state: &AccountState) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("engine is not running")]
    NotRunning,
    #[error("engine is in a degraded state pending reconciliation")]
    Degraded,
    #[error("no client registered for venue {0}")]
    UnknownVenue(Venue),
}

/// Lifecycle states (§4.4): `PRE_INITIALIZED -> INITIALIZED -> RUNNING ->
/// STOPPED -> DISPOSED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EngineState {
    PreInitialized = 0,
    Initialized = 1,
    Running = 2,
    Stopped = 3,
    Disposed = 4,
}

impl EngineState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::PreInitialized,
            1 => Self::Initialized,
            2 => Self::Running,
            3 => Self::Stopped,
            _ => Self::Disposed,
        }
    }
}

/// The execution engine: owns the bounded command/event queue, the registered
/// venue clients, the authoritative database, and (by injection) the
/// portfolio event sink.
pub struct ExecutionEngine {
    clients: DashMap<Venue, Arc<dyn ExecutionClient>>,
    database: Arc<dyn ExecutionDatabase>,
    portfolio: Arc<dyn EventSink>,
    tx: mpsc::Sender<EngineMessage>,
    rx: std::sync::Mutex<Option<mpsc::Receiver<EngineMessage>>>,
    consumer: std::sync::Mutex<Option<tokio::task::JoinHandle<()>>>,
    state: AtomicU8,
    degraded: std::sync::atomic::AtomicBool,
    qsize: usize,
}

impl std::fmt::Debug for ExecutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionEngine")
            .field("qsize", &self.qsize)
            .field("state", &EngineState::from_u8(self.state.load(Ordering::SeqCst)))
            .field("clients", &self.clients.len())
            .finish_non_exhaustive()
    }
}

impl ExecutionEngine {
    /// Creates a new engine with a bounded queue of capacity `qsize` (§6:
    /// default 10,000). The engine starts `PRE_INITIALIZED`.
    #[must_use]
    pub fn new(database: Arc<dyn ExecutionDatabase>, portfolio: Arc<dyn EventSink>, qsize: usize) -> Self {
        let (tx, rx) = mpsc::channel(qsize.max(1));
        Self {
            clients: DashMap::new(),
            database,
            portfolio,
            tx,
            rx: std::sync::Mutex::new(Some(rx)),
            consumer: std::sync::Mutex::new(None),
            state: AtomicU8::new(EngineState::PreInitialized as u8),
            degraded: std::sync::atomic::AtomicBool::new(false),
            qsize,
        }
    }

    /// Creates a new engine from a parsed [`EngineConfig`] (§6's
    /// `engine.qsize` key), rather than extracting `qsize` by hand at every
    /// call site.
    #[must_use]
    pub fn from_config(
        config: &EngineConfig,
        database: Arc<dyn ExecutionDatabase>,
        portfolio: Arc<dyn EventSink>,
    ) -> Self {
        Self::new(database, portfolio, config.qsize)
    }

    #[must_use]
    pub fn qsize(&self) -> usize {
        self.qsize
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        EngineState::from_u8(self.state.load(Ordering::SeqCst))
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    pub fn register_client(&self, client: Arc<dyn ExecutionClient>) {
        self.clients.insert(client.venue(), client);
        if matches!(self.state(), EngineState::PreInitialized) {
            self.state.store(EngineState::Initialized as u8, Ordering::SeqCst);
        }
    }

    pub fn deregister_client(&self, venue: Venue) {
        self.clients.remove(&venue);
    }

    /// Enqueues a command, suspending only if the queue is full (§5).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Degraded`] if the engine is awaiting a successful
    /// reconciliation pass, or [`EngineError::UnknownVenue`] if no client is
    /// registered for `command`'s venue — both are validation-boundary
    /// rejections (§7: "surfaced synchronously at the boundary; never
    /// enqueued") and never reach the queue.
    pub async fn execute(&self, command: TradingCommand) -> Result<(), EngineError> {
        if !matches!(self.state(), EngineState::Running) {
            return Err(EngineError::NotRunning);
        }
        if self.is_degraded() {
            return Err(EngineError::Degraded);
        }
        let venue = command.security().venue();
        if !self.clients.contains_key(&venue) {
            return Err(EngineError::UnknownVenue(venue));
        }
        tracing::debug!("{CMD} {command}");
        self.enqueue(EngineMessage::Command(command)).await;
        Ok(())
    }

    /// Enqueues an event produced by a client callback, suspending only if the
    /// queue is full (§5). Unlike `execute`, `process` is never rejected for
    /// being degraded — a client's own events are exactly what resolves the
    /// degraded state via reconciliation.
    pub async fn process(&self, event: OrderEventAny) {
        tracing::debug!("{RECV} {EVT} {event}");
        self.enqueue(EngineMessage::Event(event)).await;
    }

    /// Enqueues a client-reported `AccountState` (§3 Account), suspending only
    /// if the queue is full (§5). Never rejected for being degraded, for the
    /// same reason `process` isn't.
    pub async fn process_account(&self, state: AccountState) {
        tracing::debug!("{RECV} {EVT} account state for {}", state.venue);
        self.enqueue(EngineMessage::Account(state)).await;
    }

    async fn enqueue(&self, message: EngineMessage) {
        if self.tx.capacity() == 0 {
            tracing::warn!("engine queue full at capacity {}; backpressuring", self.qsize);
        }
        // A closed receiver only happens after `stop`/`kill`; dropping the
        // message is correct since there is no consumer left to see it.
        let _ = self.tx.send(message).await;
    }

    /// Starts the consumer task. Requires the engine be held behind an `Arc`
    /// since the task outlives this call.
    pub fn start(self: &Arc<Self>) {
        if !matches!(self.state(), EngineState::Initialized) {
            return;
        }
        let Some(rx) = self.rx.lock().expect("rx mutex poisoned").take() else {
            return;
        };
        let engine = Arc::clone(self);
        let handle = tokio::spawn(async move { engine.run(rx).await });
        *self.consumer.lock().expect("consumer mutex poisoned") = Some(handle);
        self.state.store(EngineState::Running as u8, Ordering::SeqCst);
    }

    async fn run(self: Arc<Self>, mut rx: mpsc::Receiver<EngineMessage>) {
        ironclad_common::logging::log_task_started("execution-engine-consumer");
        while let Some(message) = rx.recv().await {
            match message {
                EngineMessage::Shutdown => break,
                EngineMessage::Command(command) => self.dispatch_command(command).await,
                EngineMessage::Event(event) => self.apply_event(&event),
                EngineMessage::Account(state) => self.apply_account(&state),
            }
        }
        ironclad_common::logging::log_task_stopped("execution-engine-consumer");
    }

    async fn dispatch_command(&self, command: TradingCommand) {
        let venue = command.security().venue();
        // `execute` already rejected an unregistered venue synchronously; a
        // miss here means the client deregistered between that check and this
        // dispatch. Treat it the same as a transport failure (§7).
        let Some(client) = self.clients.get(&venue).map(|e| Arc::clone(e.value())) else {
            self.reject_command(&command, "no client registered for venue".to_string());
            return;
        };
        let result = match &command {
            TradingCommand::SubmitOrder(c) => client.submit_order(c.clone()).await,
            TradingCommand::SubmitBracketOrder(c) => {
                client.submit_bracket_order(c.clone()).await
            }
            TradingCommand::CancelOrder(c) => client.cancel_order(*c).await,
            TradingCommand::ModifyOrder(c) => client.modify_order(*c).await,
        };
        if let Err(err) = result {
            tracing::error!(%venue, error = %err, "{EVT} command rejected at transport");
            self.reject_command(&command, err.to_string());
        }
    }

    /// Synthesizes an `OrderRejected` for `command`'s order and applies it
    /// through the same path as a venue-reported rejection (§7 "Transport":
    /// "commands for the affected venue are answered with a rejection
    /// event"), so the FSM and portfolio observe the failure instead of the
    /// command silently vanishing. A no-op if the order is unknown to the
    /// database (nothing to transition).
    fn reject_command(&self, command: &TradingCommand, reason: String) {
        let client_order_id = command.client_order_id();
        let Some(order) = self.database.order(client_order_id) else {
            tracing::warn!(%client_order_id, "rejected command has no matching order; nothing to transition");
            return;
        };
        let ts = UnixNanos::now();
        let account_id = self
            .database
            .account(order.security.venue())
            .map(|a| a.account_id)
            .unwrap_or_else(|| {
                ironclad_model::identifiers::AccountId::new(format!("{}-REJECT", order.security.venue()))
            });
        let event = OrderEventAny::Rejected(OrderRejected {
            trader_id: order.trader_id,
            strategy_id: order.strategy_id,
            client_order_id,
            account_id,
            reason,
            event_id: UUID4::new(),
            ts_event: ts,
            ts_init: ts,
        });
        self.apply_event(&event);
    }

    /// Applies a dequeued event to its order via the database, then forwards
    /// it to the portfolio — unless the event was an integrity fault, in
    /// which case the order is persisted as `INVALID` but the event is never
    /// forwarded, so the portfolio never sees (and cannot mutate on) a
    /// fraudulent fill (§8 scenario 3).
    fn apply_event(&self, event: &OrderEventAny) {
        let client_order_id = event.client_order_id();
        let Some(mut order) = self.database.order(client_order_id) else {
            tracing::warn!(%client_order_id, "event for unknown order dropped");
            return;
        };
        match order.apply(event) {
            Ok(()) => {
                self.database.update_order(order);
                self.portfolio.process_event(event);
            }
            Err(OrderError::InvalidStateTransition(err)) => {
                tracing::warn!(%client_order_id, %err, "illegal order transition dropped; state unchanged");
            }
            Err(OrderError::Integrity { reason, .. }) => {
                tracing::error!(%client_order_id, reason, "integrity fault; order forced INVALID");
                self.database.update_order(order);
            }
        }
    }

    /// Applies a client-reported account state: the database is always
    /// updated (it is the authoritative store, per §3), then the portfolio is
    /// notified so its per-venue view stays in sync.
    fn apply_account(&self, state: &AccountState) {
        self.database.update_account(state);
        self.portfolio.process_account(state);
    }

    /// Posts the shutdown sentinel and waits for the consumer to drain and
    /// exit. Cooperative: any message already in flight finishes its FSM
    /// transition first (transitions never suspend).
    pub async fn stop(&self) {
        if !matches!(self.state(), EngineState::Running) {
            return;
        }
        let _ = self.tx.send(EngineMessage::Shutdown).await;
        let handle = self.consumer.lock().expect("consumer mutex poisoned").take();
        if let Some(handle) = handle {
            ironclad_common::logging::log_task_awaiting("execution-engine-consumer");
            let _ = handle.await;
        }
        self.state.store(EngineState::Stopped as u8, Ordering::SeqCst);
    }

    /// Aborts the consumer task immediately, without draining. Used only when
    /// an orderly `stop` is itself compromised (§4.4).
    pub async fn kill(&self) {
        let handle = self.consumer.lock().expect("consumer mutex poisoned").take();
        if let Some(handle) = handle {
            handle.abort();
            ironclad_common::logging::log_task_aborted("execution-engine-consumer");
        }
        self.state.store(EngineState::Stopped as u8, Ordering::SeqCst);
    }

    /// Runs the reconciliation protocol (§4.5) against every registered
    /// client. While unresolved, the engine is degraded and `execute` is
    /// rejected (§7 reconciliation failure).
    pub async fn reconcile_state(&self, timeout: Duration, poll_interval: Duration) -> bool {
        let clients: Vec<Arc<dyn ExecutionClient>> = self
            .clients
            .iter()
            .map(|e| Arc::clone(e.value()))
            .collect();
        let resolved = reconcile_state(
            self.database.as_ref(),
            &clients,
            timeout,
            poll_interval,
            UnixNanos::now,
        )
        .await;
        self.degraded.store(!resolved, Ordering::SeqCst);
        resolved
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use ironclad_model::identifiers::OrderId;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{
        client::ExecutionClientError,
        commands::{CancelOrder, ModifyOrder, SubmitBracketOrder, SubmitOrder},
        database::InMemoryExecutionDatabase,
        reports::ExecutionStateReport,
    };

    #[derive(Debug, Default)]
    struct CountingClient {
        venue: Venue,
        submits: AtomicUsize,
    }

    #[async_trait]
    impl ExecutionClient for CountingClient {
        fn venue(&self) -> Venue {
            self.venue
        }

        fn is_connected(&self) -> bool {
            true
        }

        async fn connect(&self) -> Result<(), ExecutionClientError> {
            Ok(())
        }

        async fn disconnect(&self) -> Result<(), ExecutionClientError> {
            Ok(())
        }

        async fn submit_order(&self, _command: SubmitOrder) -> Result<(), ExecutionClientError> {
            self.submits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn submit_bracket_order(
            &self,
            _command: SubmitBracketOrder,
        ) -> Result<(), ExecutionClientError> {
            Ok(())
        }

        async fn cancel_order(&self, _command: CancelOrder) -> Result<(), ExecutionClientError> {
            Ok(())
        }

        async fn modify_order(&self, _command: ModifyOrder) -> Result<(), ExecutionClientError> {
            Ok(())
        }

        async fn state_report(
            &self,
            _order_ids: &[OrderId],
        ) -> Result<ExecutionStateReport, ExecutionClientError> {
            Ok(ExecutionStateReport::new(self.venue, UnixNanos::default()))
        }
    }

    fn security() -> ironclad_model::identifiers::Security {
        use ironclad_model::enums::{AssetClass, AssetType};
        ironclad_model::identifiers::Security::new(
            "BTCUSDT",
            "COINBASE",
            AssetClass::Crypto,
            AssetType::Spot,
        )
    }

    #[tokio::test]
    async fn test_start_stop_lifecycle() {
        let database = InMemoryExecutionDatabase::shared();
        let engine = Arc::new(ExecutionEngine::new(database, Arc::new(NullEventSink), 10));
        engine.register_client(Arc::new(CountingClient {
            venue: Venue::new("COINBASE"),
            submits: AtomicUsize::new(0),
        }));
        assert_eq!(engine.state(), EngineState::Initialized);
        engine.start();
        assert_eq!(engine.state(), EngineState::Running);
        engine.stop().await;
        assert_eq!(engine.state(), EngineState::Stopped);
    }

    #[tokio::test]
    async fn test_unregistered_venue_command_is_rejected_synchronously() {
        let database = InMemoryExecutionDatabase::shared();
        let engine = Arc::new(ExecutionEngine::new(database, Arc::new(NullEventSink), 10));
        engine.register_client(Arc::new(CountingClient {
            venue: Venue::new("OTHER"),
            submits: AtomicUsize::new(0),
        }));
        engine.start();
        let err = engine
            .execute(TradingCommand::CancelOrder(CancelOrder {
                client_order_id: ironclad_model::identifiers::ClientOrderId::new("O-1"),
                security: security(),
                command_id: ironclad_core::UUID4::new(),
            }))
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::UnknownVenue(Venue::new("COINBASE")));
        engine.stop().await;
    }

    #[tokio::test]
    async fn test_transport_failure_rejects_order_via_fsm() {
        #[derive(Debug, Default)]
        struct FailingClient {
            venue: Venue,
        }

        #[async_trait]
        impl ExecutionClient for FailingClient {
            fn venue(&self) -> Venue {
                self.venue
            }

            fn is_connected(&self) -> bool {
                true
            }

            async fn connect(&self) -> Result<(), ExecutionClientError> {
                Ok(())
            }

            async fn disconnect(&self) -> Result<(), ExecutionClientError> {
                Ok(())
            }

            async fn submit_order(&self, _command: SubmitOrder) -> Result<(), ExecutionClientError> {
                Err(ExecutionClientError::Disconnected {
                    venue: self.venue,
                    reason: "socket reset".into(),
                })
            }

            async fn submit_bracket_order(
                &self,
                _command: SubmitBracketOrder,
            ) -> Result<(), ExecutionClientError> {
                Ok(())
            }

            async fn cancel_order(&self, _command: CancelOrder) -> Result<(), ExecutionClientError> {
                Ok(())
            }

            async fn modify_order(&self, _command: ModifyOrder) -> Result<(), ExecutionClientError> {
                Ok(())
            }

            async fn state_report(
                &self,
                _order_ids: &[OrderId],
            ) -> Result<ExecutionStateReport, ExecutionClientError> {
                Ok(ExecutionStateReport::new(self.venue, UnixNanos::default()))
            }
        }

        let database = InMemoryExecutionDatabase::shared();
        let venue = Venue::new("COINBASE");
        let client_order_id = ironclad_model::identifiers::ClientOrderId::new("O-1");
        let mut order = ironclad_model::orders::Order::new(
            client_order_id,
            ironclad_model::identifiers::TraderId::default(),
            ironclad_model::identifiers::StrategyId::default(),
            security(),
            ironclad_model::enums::OrderSide::Buy,
            ironclad_model::enums::OrderType::Limit,
            ironclad_model::types::Quantity::new(dec!(10), 0),
            Some(ironclad_model::types::Price::new(dec!(100), 0)),
            ironclad_model::enums::TimeInForce::Gtc,
            None,
            UnixNanos::default(),
        );
        order
            .apply(&OrderEventAny::Submitted(
                ironclad_model::events::order::OrderSubmitted {
                    trader_id: order.trader_id,
                    strategy_id: order.strategy_id,
                    client_order_id,
                    account_id: ironclad_model::identifiers::AccountId::new("SIM-001"),
                    event_id: ironclad_core::UUID4::new(),
                    ts_event: UnixNanos::new(1),
                    ts_init: UnixNanos::new(1),
                },
            ))
            .unwrap();
        database.add_order(order);

        let engine = Arc::new(ExecutionEngine::new(database.clone(), Arc::new(NullEventSink), 10));
        engine.register_client(Arc::new(FailingClient { venue }));
        engine.start();
        engine
            .execute(TradingCommand::SubmitOrder(SubmitOrder {
                trader_id: ironclad_model::identifiers::TraderId::default(),
                strategy_id: ironclad_model::identifiers::StrategyId::default(),
                client_order_id,
                security: security(),
                side: ironclad_model::enums::OrderSide::Buy,
                order_type: ironclad_model::enums::OrderType::Limit,
                quantity: ironclad_model::types::Quantity::new(dec!(10), 0),
                price: Some(ironclad_model::types::Price::new(dec!(100), 0)),
                time_in_force: ironclad_model::enums::TimeInForce::Gtc,
                command_id: ironclad_core::UUID4::new(),
            }))
            .await
            .unwrap();
        engine.stop().await;

        assert_eq!(database.order(client_order_id).unwrap().status(), ironclad_model::enums::OrderStatus::Rejected);
    }

    #[rstest]
    fn test_engine_state_round_trips_through_u8() {
        for s in [
            EngineState::PreInitialized,
            EngineState::Initialized,
            EngineState::Running,
            EngineState::Stopped,
            EngineState::Disposed,
        ] {
            assert_eq!(EngineState::from_u8(s as u8), s);
        }
    }
}
