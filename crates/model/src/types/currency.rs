use serde::{Deserialize, Serialize};
use ustr::Ustr;

/// A currency code (ISO-4217-style, or an exchange-defined crypto code) plus the
/// decimal precision quantities of that currency are reported at.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    code: Ustr,
    precision: u8,
}

impl Currency {
    /// Creates a new [`Currency`].
    ///
    /// # Panics
    ///
    /// Panics if `code` is empty or contains whitespace.
    #[must_use]
    pub fn new(code: &str, precision: u8) -> Self {
        ironclad_core::correctness::check_valid_string(code, "code")
            .unwrap_or_else(|e| panic!("{e}"));
        Self {
            code: Ustr::from(code),
            precision,
        }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        self.code.as_str()
    }

    #[must_use]
    pub const fn precision(&self) -> u8 {
        self.precision
    }

    #[must_use]
    pub fn usd() -> Self {
        Self::new("USD", 2)
    }

    #[must_use]
    pub fn usdt() -> Self {
        Self::new("USDT", 6)
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code)
    }
}

impl std::fmt::Debug for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Currency(\"{}\", precision={})", self.code, self.precision)
    }
}
