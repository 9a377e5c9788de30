//! Strongly-typed identifiers used across the domain.

use core::borrow::Borrow;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InventoryError;

/// Identifier of a supply item.
///
/// Item identifiers are chosen by the operator (e.g. `C1`, `RAM-32-DDR5`), so
/// this wraps a string rather than a generated UUID. `parse` enforces the
/// non-empty rule; the `From` conversions do not and exist for lookups, where
/// an unknown or empty key simply matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Parse an identifier, rejecting empty or whitespace-only input.
    pub fn parse(value: impl Into<String>) -> Result<Self, InventoryError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(InventoryError::validation("item ID cannot be empty"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ItemId {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<ItemId> for String {
    fn from(value: ItemId) -> Self {
        value.0
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
