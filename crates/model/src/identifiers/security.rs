//! The [`Security`] identifier: a tradable instrument's globally unique identity.

use serde::{Deserialize, Serialize};
use ustr::Ustr;

use crate::enums::{AssetClass, AssetType};

/// Globally unique identifier for a tradable instrument.
///
/// Equality and hashing are defined over all four components (symbol, venue,
/// asset class, asset type); the same symbol traded as a spot instrument and as
/// a perpetual future on the same venue are distinct securities. Immutable once
/// constructed.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Security {
    symbol: Ustr,
    venue: Ustr,
    asset_class: AssetClass,
    asset_type: AssetType,
}

impl Security {
    /// Creates a new [`Security`].
    ///
    /// # Panics
    ///
    /// Panics if `symbol` or `venue` is empty or contains whitespace.
    #[must_use]
    pub fn new(
        symbol: &str,
        venue: &str,
        asset_class: AssetClass,
        asset_type: AssetType,
    ) -> Self {
        ironclad_core::correctness::check_valid_string(symbol, "symbol")
            .unwrap_or_else(|e| panic!("{e}"));
        ironclad_core::correctness::check_valid_string(venue, "venue")
            .unwrap_or_else(|e| panic!("{e}"));
        Self {
            symbol: Ustr::from(symbol),
            venue: Ustr::from(venue),
            asset_class,
            asset_type,
        }
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        self.symbol.as_str()
    }

    #[must_use]
    pub fn venue(&self) -> super::Venue {
        super::Venue::new(self.venue.as_str())
    }

    #[must_use]
    pub const fn asset_class(&self) -> AssetClass {
        self.asset_class
    }

    #[must_use]
    pub const fn asset_type(&self) -> AssetType {
        self.asset_type
    }
}

/// Stringifies as `"<symbol>.<venue>"`, matching the stable wire/log form; the asset
/// class and type are part of identity but are not part of the printable form.
impl std::fmt::Display for Security {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.symbol, self.venue)
    }
}

impl std::fmt::Debug for Security {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Security(\"{}.{}\", {:?}, {:?})",
            self.symbol, self.venue, self.asset_class, self.asset_type
        )
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_display_is_symbol_dot_venue() {
        let s = Security::new("BTCUSDT", "COINBASE", AssetClass::Crypto, AssetType::Spot);
        assert_eq!(s.to_string(), "BTCUSDT.COINBASE");
    }

    #[rstest]
    fn test_equality_considers_asset_class_and_type() {
        let spot = Security::new("BTCUSDT", "COINBASE", AssetClass::Crypto, AssetType::Spot);
        let perp = Security::new("BTCUSDT", "COINBASE", AssetClass::Crypto, AssetType::Perpetual);
        assert_ne!(spot, perp);
        assert_eq!(spot.to_string(), perp.to_string());
    }

    #[rstest]
    #[should_panic(expected = "cannot be empty")]
    fn test_new_panics_on_empty_symbol() {
        let _ = Security::new("", "COINBASE", AssetClass::Crypto, AssetType::Spot);
    }
}
