//! Domain error model.

use thiserror::Error;

use crate::id::ItemId;

/// Result type used across the inventory crates.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Inventory-level error.
///
/// Validation and lookup failures are deterministic and caused by the caller;
/// `Persistence` is the only variant that comes from the environment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// A field value or a quantity change was rejected.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An item with the same identifier is already stored.
    #[error("item with ID '{0}' already exists")]
    DuplicateId(ItemId),

    /// No item with the given identifier is stored.
    #[error("item with ID '{0}' not found")]
    NotFound(ItemId),

    /// A stored record could not be turned back into an item.
    #[error("unrecognized item record: {0}")]
    UnknownType(String),

    /// The backing store could not be read or written.
    #[error("persistence failed: {0}")]
    Persistence(String),
}

impl InventoryError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unknown_type(msg: impl Into<String>) -> Self {
        Self::UnknownType(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn not_found(id: impl Into<ItemId>) -> Self {
        Self::NotFound(id.into())
    }

    pub fn duplicate(id: impl Into<ItemId>) -> Self {
        Self::DuplicateId(id.into())
    }
}
