//! Generates process-unique `ClientOrderId`s of the form
//! `O-{datetime}-{trader_id}-{strategy_id}-{count}`, mirroring the teacher's
//! `ClientOrderIdGenerator`.

use std::sync::{atomic::AtomicUsize, Arc};

use ironclad_model::identifiers::{ClientOrderId, StrategyId, TraderId};

use super::datetime_tag;
use crate::clock::Clock;

/// Generates [`ClientOrderId`]s scoped to one `(trader_id, strategy_id)` pair.
#[derive(Debug)]
pub struct ClientOrderIdGenerator {
    clock: Arc<dyn Clock>,
    trader_id: TraderId,
    strategy_id: StrategyId,
    count: AtomicUsize,
}

impl ClientOrderIdGenerator {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, trader_id: TraderId, strategy_id: StrategyId) -> Self {
        Self {
            clock,
            trader_id,
            strategy_id,
            count: AtomicUsize::new(0),
        }
    }

    /// Generates the next [`ClientOrderId`], incrementing the internal counter.
    pub fn generate(&self) -> ClientOrderId {
        let count = self.count.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
        let tag = datetime_tag(self.clock.timestamp_ns());
        ClientOrderId::new(format!(
            "O-{tag}-{}-{}-{count}",
            self.trader_id, self.strategy_id
        ))
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Resets the counter to zero, as after a fresh backtest run.
    pub fn reset(&self) {
        self.count.store(0, std::sync::atomic::Ordering::SeqCst);
    }

    /// Sets the counter to a specific value, used to resume after a restart once
    /// the database reports the highest previously-issued count.
    pub fn set_count(&self, count: usize) {
        self.count.store(count, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::clock::TestClock;

    fn generator() -> ClientOrderIdGenerator {
        ClientOrderIdGenerator::new(
            Arc::new(TestClock::new()),
            TraderId::new("TRADER-001"),
            StrategyId::new("S-001"),
        )
    }

    #[rstest]
    fn test_generate_increments_count() {
        let gen = generator();
        let first = gen.generate();
        let second = gen.generate();
        assert_ne!(first, second);
        assert_eq!(gen.count(), 2);
    }

    #[rstest]
    fn test_generate_has_expected_prefix() {
        let gen = generator();
        let id = gen.generate();
        assert!(id.as_str().starts_with("O-19700101-000000-TRADER-001-S-001-1"));
    }

    #[rstest]
    fn test_reset_sets_count_back_to_zero() {
        let gen = generator();
        gen.generate();
        gen.generate();
        gen.reset();
        assert_eq!(gen.count(), 0);
    }

    #[rstest]
    fn test_set_count_resumes_from_persisted_value() {
        let gen = generator();
        gen.set_count(41);
        let id = gen.generate();
        assert!(id.as_str().ends_with("-42"));
    }
}
