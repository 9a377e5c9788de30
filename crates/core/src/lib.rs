//! `supplies-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no IO, no storage).

pub mod error;
pub mod id;

pub use error::{InventoryError, InventoryResult};
pub use id::ItemId;
