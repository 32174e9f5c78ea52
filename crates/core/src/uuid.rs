//! A UUIDv4 identifier used for correlation ids (command ids, event ids, report ids).

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A 128-bit UUID (version 4), used wherever the system needs a globally unique
/// correlation id that carries no semantic meaning of its own.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UUID4(uuid::Uuid);

impl UUID4 {
    /// Creates a new random [`UUID4`].
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a [`UUID4`] from an existing value, for deterministic tests.
    #[must_use]
    pub const fn from_uuid(value: uuid::Uuid) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn as_uuid(&self) -> uuid::Uuid {
        self.0
    }
}

impl Default for UUID4 {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for UUID4 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Debug for UUID4 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UUID4(\"{}\")", self.0)
    }
}

impl std::str::FromStr for UUID4 {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(uuid::Uuid::parse_str(s)?))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_new_is_unique() {
        let a = UUID4::new();
        let b = UUID4::new();
        assert_ne!(a, b);
    }

    #[rstest]
    fn test_display_round_trips_through_parse() {
        let id = UUID4::new();
        let parsed: UUID4 = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
