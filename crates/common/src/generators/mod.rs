//! Generators for process-unique identifiers (`ClientOrderId`, `PositionId`),
//! grounded on the teacher's `common::generators` module. Each generator is
//! owned by exactly one `(trader_id, strategy_id)` pair and produces a
//! monotonically increasing, human-greppable tag.

mod client_order_id;
mod position_id;

pub use client_order_id::ClientOrderIdGenerator;
pub use position_id::PositionIdGenerator;

use ironclad_core::UnixNanos;

/// Renders a timestamp as `YYYYMMDD-HHMMSS`, matching the teacher's datetime tag.
pub(crate) fn datetime_tag(ts: UnixNanos) -> String {
    let secs = (ts.as_u64() / 1_000_000_000) as i64;
    let dt = chrono::DateTime::from_timestamp(secs, 0).unwrap_or_default();
    dt.format("%Y%m%d-%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_datetime_tag_epoch() {
        assert_eq!(datetime_tag(UnixNanos::new(0)), "19700101-000000");
    }
}
