//! Inventory of computer supply items.
//!
//! `item` and `factory` are pure domain logic; `store` and `repository` add the
//! JSON persistence that keeps the inventory across runs.

pub mod factory;
pub mod item;
pub mod repository;
pub mod store;

pub use factory::from_record;
pub use item::{Item, ItemAttributes, ItemKind, MAX_QUANTITY};
pub use repository::{InventoryRepository, LoadReport, LoadWarning};
pub use store::{InMemoryStore, InventoryStore, JsonFileStore};
