//! The reconciliation protocol (§4.5): on start, and whenever a client
//! reconnects, compare the database's view of every open order against the
//! venue's own view, synthesize whatever events are needed to converge the
//! two, and keep polling until they agree or a timeout expires.
//!
//! Grounded on the teacher's `ReconciliationManager`
//! (`crates/live/src/reconciliation.rs`), scaled down to the single operation
//! this system exposes: `reconcile_state`. The teacher's richer machinery
//! (inflight-order tracking, external-order claiming, lookback windows) is not
//! carried over — nothing in this system submits orders the engine didn't
//! originate, so there is no "external order" case to claim.

use std::{collections::HashMap, sync::Arc, time::Duration};

use ironclad_core::{UnixNanos, UUID4};
use ironclad_model::{
    enums::OrderStatus,
    events::order::{
        OrderAccepted, OrderCancelled, OrderEventAny, OrderExpired, OrderFilled,
        OrderPartiallyFilled, OrderRejected, OrderTriggered, OrderWorking,
    },
    identifiers::{ExecutionId, OrderId, Venue},
    orders::Order,
    types::Money,
};
use tokio::time::Instant;

use crate::{client::ExecutionClient, database::ExecutionDatabase, reports::ExecutionStateReport};

const RECON: &str = ironclad_common::logging::RECON;

/// Runs reconciliation to convergence or until `timeout` elapses, sleeping
/// `poll_interval` between passes. Returns whether every open order converged.
///
/// `now` is injected so the caller supplies a live or test clock (§9 global
/// clock design note) without this module depending on `ironclad-common`'s
/// `Clock` trait directly.
pub async fn reconcile_state(
    database: &dyn ExecutionDatabase,
    clients: &[Arc<dyn ExecutionClient>],
    timeout: Duration,
    poll_interval: Duration,
    now: fn() -> UnixNanos,
) -> bool {
    let deadline = Instant::now() + timeout;

    loop {
        let open_orders = database.orders_open();
        if open_orders.is_empty() {
            return true;
        }

        let mut by_venue: HashMap<Venue, Vec<Order>> = HashMap::new();
        let mut pending_no_id = Vec::new();
        for order in open_orders {
            if order.order_id.is_some() {
                by_venue.entry(order.security.venue()).or_default().push(order);
            } else {
                pending_no_id.push(order);
            }
        }

        let mut unresolved = 0usize;

        // §4.5 step 2: query every venue's state report in parallel, not one
        // at a time — a slow or unreachable venue must not stall the others.
        let mut queries = Vec::new();
        for client in clients {
            let venue = client.venue();
            let Some(orders) = by_venue.remove(&venue) else {
                continue;
            };
            let order_ids: Vec<OrderId> = orders.iter().filter_map(|o| o.order_id).collect();
            let client = Arc::clone(client);
            queries.push(async move {
                let result = client.state_report(&order_ids).await;
                (venue, orders, result)
            });
        }
        let results = futures::future::join_all(queries).await;

        for (venue, orders, result) in results {
            match result {
                Ok(report) => {
                    for order in &orders {
                        if !reconcile_order(database, order, &report, now) {
                            unresolved += 1;
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(%venue, error = %err, "{RECON} state report unavailable this pass");
                    unresolved += orders.len();
                }
            }
        }
        // Anything left in `by_venue` belongs to a venue with no registered
        // client at all; it can never converge on its own.
        unresolved += by_venue.values().map(Vec::len).sum::<usize>();

        let timed_out = Instant::now() >= deadline;

        if timed_out {
            // §4.5 tie-break: unknown-to-venue while locally SUBMITTED resolves
            // to REJECTED. An order that never received a venue order id and
            // never will within the timeout is, by construction, unknown to
            // the venue — there is nothing left to query it by.
            for order in &pending_no_id {
                force_reject(
                    database,
                    order,
                    "reconciliation timeout: venue never acknowledged submission".into(),
                    now,
                );
            }
            return unresolved == 0;
        }

        if !pending_no_id.is_empty() {
            unresolved += pending_no_id.len();
        }

        if unresolved == 0 {
            return true;
        }

        tokio::time::sleep(poll_interval).await;
    }
}

/// Compares one order against the venue's report and synthesizes whatever
/// single event closes the gap this pass. Returns `true` if the order already
/// matched (nothing to do), `false` if a mismatch was found (whether or not it
/// could be resolved this pass).
///
/// A locally terminal order is never passed here: `orders_open()` excludes it
/// by construction, so the "local terminal but venue reports live" tie-break
/// named in §4.5 never actually reaches this function — terminal orders are
/// simply outside reconciliation's domain (see `DESIGN.md`).
fn reconcile_order(
    database: &dyn ExecutionDatabase,
    order: &Order,
    report: &ExecutionStateReport,
    now: fn() -> UnixNanos,
) -> bool {
    let Some(order_id) = order.order_id else {
        return true;
    };

    if !report.contains(order_id) {
        tracing::error!(
            %order_id, client_order_id = %order.client_order_id,
            "{RECON} order unknown to venue; forcing REJECTED"
        );
        force_reject(database, order, "order unknown to venue during reconciliation".into(), now);
        return false;
    }

    let reported_status = report.state(order_id).expect("checked contains above");
    let reported_filled = report.filled_qty(order_id).unwrap_or(order.filled_qty);

    if reported_status == order.status() && reported_filled <= order.filled_qty {
        return true;
    }

    // The transition table's only edge into REJECTED is `(SUBMITTED,
    // Rejected)`; once local has already left SUBMITTED there is no trigger
    // that can ever reach REJECTED again. Chasing the venue's report through
    // `synthesize_event` in that case would synthesize WORKING every pass and
    // never converge. Force CANCELLED instead, reachable from every open
    // state, and stop.
    if reported_status == OrderStatus::Rejected && order.status() != OrderStatus::Submitted {
        tracing::error!(
            %order_id, client_order_id = %order.client_order_id,
            local = %order.status(),
            "{RECON} venue reports REJECTED but local order already left SUBMITTED; forcing CANCELLED"
        );
        force_cancel(database, order, now);
        return false;
    }

    let Some(event) =
        synthesize_event(database, order, order_id, reported_status, reported_filled, report, now)
    else {
        tracing::warn!(
            %order_id, client_order_id = %order.client_order_id,
            local = %order.status(), venue = %reported_status,
            "{RECON} no synthesis rule for this divergence; leaving unresolved"
        );
        return false;
    };

    apply_and_persist(database, order, event);
    false
}

/// Builds the single event that moves `order` one step toward what the venue
/// reports. A fill delta always takes priority over a bare status change,
/// since the status difference is usually just a side effect of the fill.
fn synthesize_event(
    database: &dyn ExecutionDatabase,
    order: &Order,
    order_id: OrderId,
    reported_status: OrderStatus,
    reported_filled: ironclad_model::types::Quantity,
    report: &ExecutionStateReport,
    now: fn() -> UnixNanos,
) -> Option<OrderEventAny> {
    let ts = now();
    let current = order.status();

    // The transition table has no direct edge from ACCEPTED to TRIGGERED,
    // PARTIALLY_FILLED, FILLED, or EXPIRED — every one of those passes through
    // WORKING first. Take that hop now; the next pass will see `current ==
    // Working` and make further progress toward `reported_status`.
    if current == OrderStatus::Accepted
        && !matches!(reported_status, OrderStatus::Working | OrderStatus::Cancelled)
    {
        return Some(OrderEventAny::Working(OrderWorking {
            client_order_id: order.client_order_id,
            order_id,
            price: order.price,
            event_id: UUID4::new(),
            ts_event: ts,
            ts_init: ts,
        }));
    }

    let fill_capable = matches!(
        current,
        OrderStatus::Working | OrderStatus::Triggered | OrderStatus::PartiallyFilled
    );

    if reported_filled > order.filled_qty && fill_capable {
        let delta = reported_filled - order.filled_qty;
        let fill_price = report
            .avg_px(order_id)
            .or(order.price)
            .unwrap_or_else(|| ironclad_model::types::Price::new(rust_decimal::Decimal::ZERO, 0));
        let trade_id = ExecutionId::new(format!("RECON-{}-{}", order.client_order_id, ts));
        let commission = Money::zero(default_currency());
        let fields = (
            order.client_order_id,
            order_id,
            trade_id,
            order.side,
            delta,
            fill_price,
            commission,
            ironclad_model::enums::LiquiditySide::Taker,
            UUID4::new(),
            ts,
            ts,
        );
        return Some(if reported_status == OrderStatus::Filled {
            OrderEventAny::Filled(OrderFilled {
                client_order_id: fields.0,
                order_id: fields.1,
                account_id: order_account_id(database, order),
                trade_id: fields.2,
                order_side: fields.3,
                fill_qty: fields.4,
                fill_price: fields.5,
                commission: fields.6,
                liquidity_side: fields.7,
                event_id: fields.8,
                ts_event: fields.9,
                ts_init: fields.10,
            })
        } else {
            OrderEventAny::PartiallyFilled(OrderPartiallyFilled {
                client_order_id: fields.0,
                order_id: fields.1,
                account_id: order_account_id(database, order),
                trade_id: fields.2,
                order_side: fields.3,
                fill_qty: fields.4,
                fill_price: fields.5,
                commission: fields.6,
                liquidity_side: fields.7,
                event_id: fields.8,
                ts_event: fields.9,
                ts_init: fields.10,
            })
        });
    }

    match reported_status {
        OrderStatus::Accepted => Some(OrderEventAny::Accepted(OrderAccepted {
            trader_id: order.trader_id,
            strategy_id: order.strategy_id,
            client_order_id: order.client_order_id,
            order_id,
            account_id: order_account_id(database, order),
            event_id: UUID4::new(),
            ts_event: ts,
            ts_init: ts,
        })),
        OrderStatus::Working => Some(OrderEventAny::Working(OrderWorking {
            client_order_id: order.client_order_id,
            order_id,
            price: order.price,
            event_id: UUID4::new(),
            ts_event: ts,
            ts_init: ts,
        })),
        OrderStatus::Triggered => Some(OrderEventAny::Triggered(OrderTriggered {
            client_order_id: order.client_order_id,
            order_id,
            event_id: UUID4::new(),
            ts_event: ts,
            ts_init: ts,
        })),
        OrderStatus::Cancelled => Some(OrderEventAny::Cancelled(OrderCancelled {
            client_order_id: order.client_order_id,
            order_id: Some(order_id),
            event_id: UUID4::new(),
            ts_event: ts,
            ts_init: ts,
        })),
        OrderStatus::Expired => Some(OrderEventAny::Expired(OrderExpired {
            client_order_id: order.client_order_id,
            order_id: Some(order_id),
            event_id: UUID4::new(),
            ts_event: ts,
            ts_init: ts,
        })),
        OrderStatus::Rejected => Some(OrderEventAny::Rejected(OrderRejected {
            trader_id: order.trader_id,
            strategy_id: order.strategy_id,
            client_order_id: order.client_order_id,
            account_id: order_account_id(database, order),
            reason: "venue reports order rejected".into(),
            event_id: UUID4::new(),
            ts_event: ts,
            ts_init: ts,
        })),
        _ => None,
    }
}

fn force_reject(database: &dyn ExecutionDatabase, order: &Order, reason: String, now: fn() -> UnixNanos) {
    let ts = now();
    let event = OrderEventAny::Rejected(OrderRejected {
        trader_id: order.trader_id,
        strategy_id: order.strategy_id,
        client_order_id: order.client_order_id,
        account_id: order_account_id(database, order),
        reason,
        event_id: UUID4::new(),
        ts_event: ts,
        ts_init: ts,
    });
    apply_and_persist(database, order, event);
}

fn force_cancel(database: &dyn ExecutionDatabase, order: &Order, now: fn() -> UnixNanos) {
    let ts = now();
    let event = OrderEventAny::Cancelled(OrderCancelled {
        client_order_id: order.client_order_id,
        order_id: order.order_id,
        event_id: UUID4::new(),
        ts_event: ts,
        ts_init: ts,
    });
    apply_and_persist(database, order, event);
}

fn apply_and_persist(database: &dyn ExecutionDatabase, order: &Order, event: OrderEventAny) {
    let mut order = order.clone();
    match order.apply(&event) {
        Ok(()) => database.update_order(order),
        Err(err) => {
            tracing::error!(
                client_order_id = %order.client_order_id, error = %err,
                "{RECON} synthesized event rejected by order FSM"
            );
        }
    }
}

/// `Order` carries no `account_id` of its own, so a synthesized event borrows
/// whatever account state the database already has for the order's venue,
/// falling back to a venue-scoped placeholder when none has arrived yet (the
/// very first reconciliation pass after a cold start, before any
/// `AccountState` has been reported).
fn order_account_id(
    database: &dyn ExecutionDatabase,
    order: &Order,
) -> ironclad_model::identifiers::AccountId {
    database
        .account(order.security.venue())
        .map(|a| a.account_id)
        .unwrap_or_else(|| {
            ironclad_model::identifiers::AccountId::new(format!("{}-RECON", order.security.venue()))
        })
}

fn default_currency() -> ironclad_model::types::Currency {
    ironclad_model::types::Currency::usdt()
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use ironclad_model::{
        enums::{AssetClass, AssetType, OrderSide, OrderType, TimeInForce},
        identifiers::{ClientOrderId, Security, StrategyId, TraderId},
        types::{Price, Quantity},
    };
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{client::ExecutionClientError, database::InMemoryExecutionDatabase, reports::OrderStatusReport};

    fn security() -> Security {
        Security::new("BTCUSDT", "COINBASE", AssetClass::Crypto, AssetType::Spot)
    }

    fn working_order(order_id: &str) -> Order {
        let mut order = Order::new(
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
        );
        order
            .apply(&OrderEventAny::Submitted(
                ironclad_model::events::order::OrderSubmitted {
                    trader_id: order.trader_id,
                    strategy_id: order.strategy_id,
                    client_order_id: order.client_order_id,
                    account_id: ironclad_model::identifiers::AccountId::new("SIM-001"),
                    event_id: UUID4::new(),
                    ts_event: UnixNanos::new(1),
                    ts_init: UnixNanos::new(1),
                },
            ))
            .unwrap();
        order
            .apply(&OrderEventAny::Accepted(OrderAccepted {
                trader_id: order.trader_id,
                strategy_id: order.strategy_id,
                client_order_id: order.client_order_id,
                order_id: OrderId::new(order_id),
                account_id: ironclad_model::identifiers::AccountId::new("SIM-001"),
                event_id: UUID4::new(),
                ts_event: UnixNanos::new(2),
                ts_init: UnixNanos::new(2),
            }))
            .unwrap();
        order
    }

    struct StubClient {
        venue: Venue,
        report: ExecutionStateReport,
    }

    #[async_trait]
    impl ExecutionClient for StubClient {
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

        async fn submit_order(
            &self,
            _command: crate::commands::SubmitOrder,
        ) -> Result<(), ExecutionClientError> {
            Ok(())
        }

        async fn submit_bracket_order(
            &self,
            _command: crate::commands::SubmitBracketOrder,
        ) -> Result<(), ExecutionClientError> {
            Ok(())
        }

        async fn cancel_order(
            &self,
            _command: crate::commands::CancelOrder,
        ) -> Result<(), ExecutionClientError> {
            Ok(())
        }

        async fn modify_order(
            &self,
            _command: crate::commands::ModifyOrder,
        ) -> Result<(), ExecutionClientError> {
            Ok(())
        }

        async fn state_report(
            &self,
            _order_ids: &[OrderId],
        ) -> Result<ExecutionStateReport, ExecutionClientError> {
            Ok(self.report.clone())
        }
    }

    #[tokio::test]
    async fn test_already_converged_returns_immediately() {
        let database = InMemoryExecutionDatabase::shared();
        let order = working_order("X-1");
        database.add_order(order.clone());

        let mut report = ExecutionStateReport::new(Venue::new("COINBASE"), UnixNanos::default());
        report.insert(OrderStatusReport {
            order_id: order.order_id.unwrap(),
            order_status: OrderStatus::Accepted,
            filled_qty: Quantity::zero(0),
            avg_px: None,
        });
        let client: Arc<dyn ExecutionClient> = Arc::new(StubClient { venue: Venue::new("COINBASE"), report });

        let resolved = reconcile_state(
            database.as_ref(),
            &[client],
            Duration::from_secs(1),
            Duration::from_millis(1),
            UnixNanos::now,
        )
        .await;
        assert!(resolved);
        assert_eq!(database.order(order.client_order_id).unwrap().status(), OrderStatus::Accepted);
    }

    #[tokio::test]
    async fn test_venue_reports_fill_local_catches_up() {
        let database = InMemoryExecutionDatabase::shared();
        let order = working_order("X-2");
        database.add_order(order.clone());

        let mut report = ExecutionStateReport::new(Venue::new("COINBASE"), UnixNanos::default());
        report.insert(OrderStatusReport {
            order_id: order.order_id.unwrap(),
            order_status: OrderStatus::Filled,
            filled_qty: Quantity::new(dec!(10), 0),
            avg_px: Some(Price::new(dec!(101), 0)),
        });
        let client: Arc<dyn ExecutionClient> = Arc::new(StubClient { venue: Venue::new("COINBASE"), report });

        let resolved = reconcile_state(
            database.as_ref(),
            &[client],
            Duration::from_secs(1),
            Duration::from_millis(1),
            UnixNanos::now,
        )
        .await;
        assert!(resolved);
        let updated = database.order(order.client_order_id).unwrap();
        assert_eq!(updated.status(), OrderStatus::Filled);
        assert_eq!(updated.filled_qty.raw(), dec!(10));
    }

    #[tokio::test]
    async fn test_venue_reports_rejected_after_accepted_forces_cancelled() {
        let database = InMemoryExecutionDatabase::shared();
        let order = working_order("X-5");
        database.add_order(order.clone());

        let mut report = ExecutionStateReport::new(Venue::new("COINBASE"), UnixNanos::default());
        report.insert(OrderStatusReport {
            order_id: order.order_id.unwrap(),
            order_status: OrderStatus::Rejected,
            filled_qty: Quantity::zero(0),
            avg_px: None,
        });
        let client: Arc<dyn ExecutionClient> = Arc::new(StubClient { venue: Venue::new("COINBASE"), report });

        let resolved = reconcile_state(
            database.as_ref(),
            &[client],
            Duration::from_millis(20),
            Duration::from_millis(1),
            UnixNanos::now,
        )
        .await;
        assert!(resolved);
        assert_eq!(database.order(order.client_order_id).unwrap().status(), OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_unknown_to_venue_forces_rejected() {
        let database = InMemoryExecutionDatabase::shared();
        let order = working_order("X-3");
        database.add_order(order.clone());

        let report = ExecutionStateReport::new(Venue::new("COINBASE"), UnixNanos::default());
        let client: Arc<dyn ExecutionClient> = Arc::new(StubClient { venue: Venue::new("COINBASE"), report });

        let resolved = reconcile_state(
            database.as_ref(),
            &[client],
            Duration::from_millis(20),
            Duration::from_millis(1),
            UnixNanos::now,
        )
        .await;
        assert!(resolved);
        assert_eq!(database.order(order.client_order_id).unwrap().status(), OrderStatus::Rejected);
    }

    #[tokio::test]
    async fn test_no_registered_client_times_out_unresolved() {
        let database = InMemoryExecutionDatabase::shared();
        let order = working_order("X-4");
        database.add_order(order);

        let resolved = reconcile_state(
            database.as_ref(),
            &[],
            Duration::from_millis(10),
            Duration::from_millis(1),
            UnixNanos::now,
        )
        .await;
        assert!(!resolved);
    }

    #[rstest]
    fn test_default_currency_is_usdt() {
        assert_eq!(default_currency().code(), "USDT");
    }
}
