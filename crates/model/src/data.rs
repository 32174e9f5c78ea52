//! Stable wire-form tick types (§6 External interfaces). These are produced by
//! the (out-of-scope) data ingestion pipeline and consumed only as values here;
//! the engine itself never subscribes to or parses a data feed.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    enums::OrderSide,
    identifiers::{ExecutionId, Security},
    types::{Price, Quantity},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected} comma-separated fields, found {found}: {raw:?}")]
pub struct TickParseError {
    expected: usize,
    found: usize,
    raw: String,
}

/// `"<bid>,<ask>,<bid_size>,<ask_size>,<unix_ms>"`, appended after the security id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteTick {
    pub security: Security,
    pub bid: Price,
    pub ask: Price,
    pub bid_size: Quantity,
    pub ask_size: Quantity,
    pub unix_ms: u64,
}

impl QuoteTick {
    #[must_use]
    pub fn serialize(&self) -> String {
        format!(
            "{}.{},{},{},{},{},{}",
            self.security.symbol(),
            self.security.venue(),
            self.bid,
            self.ask,
            self.bid_size,
            self.ask_size,
            self.unix_ms
        )
    }

    /// Parses the `"<bid>,<ask>,<bid_size>,<ask_size>,<unix_ms>"` suffix for a
    /// known `security`. Strict: rejects any input with more or fewer than five
    /// fields.
    ///
    /// # Errors
    ///
    /// Returns [`TickParseError`] if `fields` does not have exactly five fields
    /// or any field fails to parse as its expected type.
    pub fn parse(security: Security, fields: &str) -> Result<Self, TickParseError> {
        let parts: Vec<&str> = fields.split(',').collect();
        if parts.len() != 5 {
            return Err(TickParseError {
                expected: 5,
                found: parts.len(),
                raw: fields.to_string(),
            });
        }
        let bid = parse_decimal(parts[0], fields)?;
        let ask = parse_decimal(parts[1], fields)?;
        let bid_size = parse_decimal(parts[2], fields)?;
        let ask_size = parse_decimal(parts[3], fields)?;
        let unix_ms = parts[4]
            .parse::<u64>()
            .map_err(|_| malformed(fields, 5))?;
        Ok(Self {
            security,
            bid: Price::new(bid, 8),
            ask: Price::new(ask, 8),
            bid_size: Quantity::new(bid_size, 8),
            ask_size: Quantity::new(ask_size, 8),
            unix_ms,
        })
    }
}

impl std::fmt::Display for QuoteTick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.serialize())
    }
}

/// `"<price>,<size>,<side>,<match_id>,<unix_ms>"`, with side in `{BUY, SELL}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeTick {
    pub security: Security,
    pub price: Price,
    pub size: Quantity,
    pub side: OrderSide,
    pub match_id: ExecutionId,
    pub unix_ms: u64,
}

impl TradeTick {
    #[must_use]
    pub fn serialize(&self) -> String {
        format!(
            "{}.{},{},{},{},{},{}",
            self.security.symbol(),
            self.security.venue(),
            self.price,
            self.size,
            self.side,
            self.match_id,
            self.unix_ms
        )
    }

    /// # Errors
    ///
    /// Returns [`TickParseError`] if `fields` does not have exactly five fields
    /// or any field fails to parse as its expected type.
    pub fn parse(security: Security, fields: &str) -> Result<Self, TickParseError> {
        let parts: Vec<&str> = fields.split(',').collect();
        if parts.len() != 5 {
            return Err(TickParseError {
                expected: 5,
                found: parts.len(),
                raw: fields.to_string(),
            });
        }
        let price = parse_decimal(parts[0], fields)?;
        let size = parse_decimal(parts[1], fields)?;
        let side = match parts[2] {
            "BUY" => OrderSide::Buy,
            "SELL" => OrderSide::Sell,
            _ => return Err(malformed(fields, 2)),
        };
        let match_id = ExecutionId::new(parts[3]);
        let unix_ms = parts[4]
            .parse::<u64>()
            .map_err(|_| malformed(fields, 4))?;
        Ok(Self {
            security,
            price: Price::new(price, 8),
            size: Quantity::new(size, 8),
            side,
            match_id,
            unix_ms,
        })
    }
}

impl std::fmt::Display for TradeTick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.serialize())
    }
}

fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, TickParseError> {
    field
        .parse::<Decimal>()
        .map_err(|_| TickParseError {
            expected: 5,
            found: 5,
            raw: raw.to_string(),
        })
}

fn malformed(raw: &str, at_field: usize) -> TickParseError {
    TickParseError {
        expected: 5,
        found: at_field,
        raw: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::enums::{AssetClass, AssetType};

    fn security() -> Security {
        Security::new("BTCUSDT", "COINBASE", AssetClass::Crypto, AssetType::Spot)
    }

    #[rstest]
    fn test_quote_tick_serialize_then_parse_round_trips() {
        let q = QuoteTick {
            security: security(),
            bid: Price::new(dec!(100), 8),
            ask: Price::new(dec!(101), 8),
            bid_size: Quantity::new(dec!(1), 8),
            ask_size: Quantity::new(dec!(2), 8),
            unix_ms: 1_700_000_000_000,
        };
        let serialized = q.serialize();
        let fields = serialized.splitn(2, ',').nth(1).unwrap();
        let parsed = QuoteTick::parse(security(), fields).unwrap();
        assert_eq!(parsed.bid.raw(), q.bid.raw());
        assert_eq!(parsed.unix_ms, q.unix_ms);
    }

    #[rstest]
    fn test_quote_tick_parse_rejects_wrong_field_count() {
        let err = QuoteTick::parse(security(), "1,2,3,4").unwrap_err();
        assert_eq!(err.found, 4);
    }

    #[rstest]
    fn test_trade_tick_serialize_then_parse_round_trips() {
        let t = TradeTick {
            security: security(),
            price: Price::new(dec!(100), 8),
            size: Quantity::new(dec!(1), 8),
            side: OrderSide::Buy,
            match_id: ExecutionId::new("M-1"),
            unix_ms: 1_700_000_000_000,
        };
        let serialized = t.serialize();
        let fields = serialized.splitn(2, ',').nth(1).unwrap();
        let parsed = TradeTick::parse(security(), fields).unwrap();
        assert_eq!(parsed.price.raw(), t.price.raw());
        assert_eq!(parsed.side, t.side);
    }

    #[rstest]
    fn test_trade_tick_parse_rejects_extra_fields() {
        let err = TradeTick::parse(security(), "1,2,BUY,M-1,1700000000000,extra").unwrap_err();
        assert_eq!(err.found, 6);
    }
}
