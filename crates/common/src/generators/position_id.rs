//! Generates process-unique `PositionId`s of the form
//! `P-{datetime}-{trader_id}-{strategy_id}-{count}`.

use std::sync::{atomic::AtomicUsize, Arc};

use ironclad_model::identifiers::{PositionId, StrategyId, TraderId};

use super::datetime_tag;
use crate::clock::Clock;

/// Generates [`PositionId`]s scoped to one `(trader_id, strategy_id)` pair.
#[derive(Debug)]
pub struct PositionIdGenerator {
    clock: Arc<dyn Clock>,
    trader_id: TraderId,
    strategy_id: StrategyId,
    count: AtomicUsize,
}

impl PositionIdGenerator {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, trader_id: TraderId, strategy_id: StrategyId) -> Self {
        Self {
            clock,
            trader_id,
            strategy_id,
            count: AtomicUsize::new(0),
        }
    }

    /// Generates the next [`PositionId`], incrementing the internal counter.
    pub fn generate(&self) -> PositionId {
        let count = self.count.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
        let tag = datetime_tag(self.clock.timestamp_ns());
        PositionId::new(format!(
            "P-{tag}-{}-{}-{count}",
            self.trader_id, self.strategy_id
        ))
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn set_count(&self, count: usize) {
        self.count.store(count, std::sync::atomic::Ordering::SeqCst);
    }
}
