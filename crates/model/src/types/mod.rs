//! Fixed-precision decimal value types. Prices, quantities, and money are never
//! represented as floating point for accounting purposes; `f64` only appears at
//! serialization/logging boundaries.

mod currency;
mod money;
mod price;
mod quantity;

pub use currency::Currency;
pub use money::Money;
pub use price::Price;
pub use quantity::Quantity;
