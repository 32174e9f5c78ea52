//! The portfolio projection (§4.6): consumes engine-forwarded order events and
//! derives per-`(strategy_id, security)` positions and per-venue accounts.
//!
//! Pure projection: [`Portfolio`] never mutates an `Order`, and it writes
//! positions through the same [`ExecutionDatabase`] the engine already uses —
//! there is exactly one authoritative store, and the portfolio is one of two
//! tasks licensed to write into it (the engine's consumer writes orders and
//! accounts; the portfolio writes positions). Its input is idempotent with
//! respect to event identity: replaying a fill already seen during
//! reconciliation must not double-count PnL, so every fill is deduplicated by
//! `(venue, execution_id)` before it touches a position (§4.6, Open Questions).
//!
//! Grounded on the teacher's `PositionIdGenerator`
//! (`crates/common/src/generators/position_id.rs`) for position identity, and
//! on the flip/reduce primitives already built on `ironclad_model::position::Position`.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]

use std::sync::Arc;

use dashmap::DashMap;
use ironclad_common::{clock::Clock, generators::PositionIdGenerator};
use ironclad_execution::{database::ExecutionDatabase, engine::EventSink};
use ironclad_model::{
    events::{
        order::OrderFilled, position::{PositionChanged, PositionClosed, PositionOpened},
        AccountState, OrderEventAny, PositionEventAny,
    },
    identifiers::{ExecutionId, Security, StrategyId, Venue},
    position::Position,
};

/// Something that wants to observe position lifecycle notifications (§4.6
/// supplement — `spec.md` describes the portfolio's inputs, not an output
/// notification shape; this is the one a reporting or alerting consumer
/// would subscribe to).
pub trait PositionEventSink: Send + Sync {
    fn process_position_event(&self, event: PositionEventAny);
}

/// A sink that drops everything, used where nothing subscribes to position
/// lifecycle notifications.
#[derive(Debug, Default)]
pub struct NullPositionEventSink;

impl PositionEventSink for NullPositionEventSink {
    fn process_position_event(&self, _event: PositionEventAny) {}
}

/// Derives positions from fills and observes account updates.
///
/// Holds no state of its own beyond fill dedup and per-strategy position-id
/// counters — every position and account read goes through `database`, the
/// same façade the engine and reconciliation protocol use, so a reporting
/// task sees one consistent view regardless of which component it asks.
pub struct Portfolio {
    database: Arc<dyn ExecutionDatabase>,
    clock: Arc<dyn Clock>,
    position_generators: DashMap<StrategyId, PositionIdGenerator>,
    seen_fills: DashMap<(Venue, ExecutionId), ()>,
    position_sink: Arc<dyn PositionEventSink>,
}

impl std::fmt::Debug for Portfolio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Portfolio")
            .field("seen_fills", &self.seen_fills.len())
            .finish_non_exhaustive()
    }
}

impl Portfolio {
    #[must_use]
    pub fn new(database: Arc<dyn ExecutionDatabase>, clock: Arc<dyn Clock>) -> Self {
        Self::with_position_sink(database, clock, Arc::new(NullPositionEventSink))
    }

    #[must_use]
    pub fn with_position_sink(
        database: Arc<dyn ExecutionDatabase>,
        clock: Arc<dyn Clock>,
        position_sink: Arc<dyn PositionEventSink>,
    ) -> Self {
        Self {
            database,
            clock,
            position_generators: DashMap::new(),
            seen_fills: DashMap::new(),
            position_sink,
        }
    }

    #[must_use]
    pub fn shared(database: Arc<dyn ExecutionDatabase>, clock: Arc<dyn Clock>) -> Arc<Self> {
        Arc::new(Self::new(database, clock))
    }

    /// Whether `(venue, execution_id)` has already been applied to a position.
    /// Exposed for tests and diagnostics; the dedup itself happens inside
    /// `apply_fill` regardless of whether a caller checks this first.
    #[must_use]
    pub fn has_seen(&self, venue: Venue, execution_id: ExecutionId) -> bool {
        self.seen_fills.contains_key(&(venue, execution_id))
    }

    fn apply_fill(&self, fill: &OrderFilled) {
        let Some(order) = self.database.order(fill.client_order_id) else {
            tracing::warn!(
                client_order_id = %fill.client_order_id,
                "fill for unknown order dropped by portfolio"
            );
            return;
        };
        let venue = order.security.venue();

        // §4.6: dedup by (venue, execution_id) so a reconciliation replay of a
        // fill already counted never mutates a position a second time.
        if self.seen_fills.insert((venue, fill.trade_id), ()).is_some() {
            tracing::debug!(
                %venue, trade_id = %fill.trade_id,
                "duplicate fill ignored by portfolio dedup"
            );
            return;
        }

        let strategy_id = order.strategy_id;
        let security = order.security;
        let currency = fill.commission.currency();
        let ts = fill.ts_event;

        match self.database.position(strategy_id, security) {
            None => self.open_position(order.trader_id, strategy_id, security, fill, currency, ts),
            Some(position) if position.is_flat() => {
                self.open_position(order.trader_id, strategy_id, security, fill, currency, ts);
            }
            Some(mut position) if position.is_opposite_side(fill.order_side) => {
                if position.would_flip(fill.order_side, fill.fill_qty) {
                    let closing_qty = position.quantity;
                    position.apply_reducing_fill(closing_qty, fill.fill_price, currency, ts);
                    self.database.update_position(position.clone());
                    self.emit_closed(&position, ts);

                    let remainder = fill.fill_qty - closing_qty;
                    let position_id = self.generator_for(order.trader_id, strategy_id).generate();
                    let flipped = Position::new(
                        position_id,
                        strategy_id,
                        security,
                        fill.order_side,
                        remainder,
                        fill.fill_price,
                        currency,
                        ts,
                    );
                    self.database.add_position(flipped.clone());
                    self.emit_opened(&flipped);
                } else {
                    position.apply_reducing_fill(fill.fill_qty, fill.fill_price, currency, ts);
                    self.database.update_position(position.clone());
                    if position.is_flat() {
                        self.emit_closed(&position, ts);
                    } else {
                        self.emit_changed(&position);
                    }
                }
            }
            Some(mut position) => {
                position.apply_same_side_fill(fill.fill_qty, fill.fill_price, ts);
                self.database.update_position(position.clone());
                self.emit_changed(&position);
            }
        }
    }

    fn emit_opened(&self, position: &Position) {
        self.position_sink.process_position_event(PositionEventAny::Opened(PositionOpened {
            position_id: position.position_id,
            strategy_id: position.strategy_id,
            security: position.security,
            side: position.side,
            quantity: position.quantity,
            avg_px: position.avg_px,
            event_id: ironclad_core::UUID4::new(),
            ts_event: position.ts_last,
        }));
    }

    fn emit_changed(&self, position: &Position) {
        self.position_sink.process_position_event(PositionEventAny::Changed(PositionChanged {
            position_id: position.position_id,
            strategy_id: position.strategy_id,
            security: position.security,
            side: position.side,
            quantity: position.quantity,
            avg_px: position.avg_px,
            realized_pnl: position.realized_pnl,
            event_id: ironclad_core::UUID4::new(),
            ts_event: position.ts_last,
        }));
    }

    fn emit_closed(&self, position: &Position, ts: ironclad_core::UnixNanos) {
        self.position_sink.process_position_event(PositionEventAny::Closed(PositionClosed {
            position_id: position.position_id,
            strategy_id: position.strategy_id,
            security: position.security,
            realized_pnl: position.realized_pnl,
            event_id: ironclad_core::UUID4::new(),
            ts_event: ts,
        }));
    }

    fn open_position(
        &self,
        trader_id: ironclad_model::identifiers::TraderId,
        strategy_id: StrategyId,
        security: Security,
        fill: &OrderFilled,
        currency: ironclad_model::types::Currency,
        ts: ironclad_core::UnixNanos,
    ) {
        let position_id = self.generator_for(trader_id, strategy_id).generate();
        let position = Position::new(
            position_id,
            strategy_id,
            security,
            fill.order_side,
            fill.fill_qty,
            fill.fill_price,
            currency,
            ts,
        );
        self.database.add_position(position.clone());
        self.emit_opened(&position);
    }

    fn generator_for(
        &self,
        trader_id: ironclad_model::identifiers::TraderId,
        strategy_id: StrategyId,
    ) -> dashmap::mapref::one::Ref<'_, StrategyId, PositionIdGenerator> {
        self.position_generators
            .entry(strategy_id)
            .or_insert_with(|| PositionIdGenerator::new(Arc::clone(&self.clock), trader_id, strategy_id));
        self.position_generators.get(&strategy_id).expect("just inserted")
    }
}

impl EventSink for Portfolio {
    fn process_event(&self, event: &OrderEventAny) {
        match event {
            OrderEventAny::Filled(fill) => self.apply_fill(fill),
            OrderEventAny::PartiallyFilled(partial) => {
                // Same projection rule as a terminal fill: only the quantity
                // and price of this particular execution matter to a position.
                self.apply_fill(&OrderFilled {
                    client_order_id: partial.client_order_id,
                    order_id: partial.order_id,
                    account_id: partial.account_id,
                    trade_id: partial.trade_id,
                    order_side: partial.order_side,
                    fill_qty: partial.fill_qty,
                    fill_price: partial.fill_price,
                    commission: partial.commission,
                    liquidity_side: partial.liquidity_side,
                    event_id: partial.event_id,
                    ts_event: partial.ts_event,
                    ts_init: partial.ts_init,
                });
            }
            _ => {}
        }
    }

    /// The database is already updated by the engine before this hook runs
    /// (§3: the database is the account's authoritative store); this exists so
    /// a future richer projection (e.g. margin-call alerting) has a place to
    /// hook in without touching the engine.
    fn process_account(&self, state: &AccountState) {
        tracing::debug!(venue = %state.venue, balance = %state.balance, "portfolio observed account update");
    }
}
