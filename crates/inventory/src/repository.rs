//! Inventory repository: the authoritative in-memory item map plus persistence.
//!
//! Every successful mutation is followed by a full save through the store. If
//! that save fails, the mutation is undone in memory before the error is
//! returned, so memory never runs ahead of what is on disk.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value as JsonValue;

use supplies_core::{InventoryError, InventoryResult, ItemId};

use crate::factory::from_record;
use crate::item::{Item, ItemKind};
use crate::store::InventoryStore;

/// Something that was skipped while loading.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadWarning {
    /// The whole document was unusable; the inventory starts empty.
    Store(InventoryError),
    /// A single record was skipped.
    Record {
        index: usize,
        item_id: Option<String>,
        error: InventoryError,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::Store(error) => write!(f, "starting with empty inventory: {error}"),
            LoadWarning::Record {
                index,
                item_id,
                error,
            } => write!(
                f,
                "could not load item '{}' (record {index}): {error}",
                item_id.as_deref().unwrap_or("unknown")
            ),
        }
    }
}

/// Outcome of a load: how many items made it in, and what was skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub loaded: usize,
    pub warnings: Vec<LoadWarning>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Owns every item, keyed by ID, and persists through `S`.
#[derive(Debug)]
pub struct InventoryRepository<S: InventoryStore> {
    items: BTreeMap<ItemId, Item>,
    store: S,
}

impl<S: InventoryStore> InventoryRepository<S> {
    /// Build a repository and load whatever the store holds.
    pub fn open(store: S) -> (Self, LoadReport) {
        let mut repository = Self {
            items: BTreeMap::new(),
            store,
        };
        let report = repository.load();
        (repository, report)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace the in-memory items with the store's contents.
    ///
    /// Never fails: an unreadable store yields an empty inventory and a
    /// `LoadWarning::Store`; each bad record is skipped with a
    /// `LoadWarning::Record`. For duplicated IDs the first record wins.
    pub fn load(&mut self) -> LoadReport {
        self.items.clear();
        let mut report = LoadReport::default();
        let location = self.store.location();

        let records = match self.store.read() {
            Ok(Some(records)) => records,
            Ok(None) => {
                tracing::info!(store = %location, "no existing inventory data; starting empty");
                return report;
            }
            Err(error) => {
                tracing::warn!(store = %location, %error, "could not read inventory; starting empty");
                report.warnings.push(LoadWarning::Store(error));
                return report;
            }
        };

        for (index, record) in records.iter().enumerate() {
            let item_id = record
                .get("item_id")
                .and_then(JsonValue::as_str)
                .map(str::to_owned);

            let result = from_record(record).and_then(|item| {
                if self.items.contains_key(item.id()) {
                    Err(InventoryError::duplicate(item.id().clone()))
                } else {
                    Ok(item)
                }
            });

            match result {
                Ok(item) => {
                    self.items.insert(item.id().clone(), item);
                    report.loaded += 1;
                }
                Err(error) => {
                    let warning = LoadWarning::Record {
                        index,
                        item_id,
                        error,
                    };
                    tracing::warn!(store = %location, "{warning}");
                    report.warnings.push(warning);
                }
            }
        }

        tracing::debug!(
            store = %location,
            loaded = report.loaded,
            skipped = report.warnings.len(),
            "inventory loaded"
        );
        report
    }

    /// Write every item to the store.
    pub fn save(&self) -> InventoryResult<()> {
        let records: Vec<JsonValue> = self.items.values().map(Item::to_record).collect();
        let count = records.len();
        self.store.write(records)?;
        tracing::info!(store = %self.store.location(), items = count, "inventory saved");
        Ok(())
    }

    pub fn add(&mut self, item: Item) -> InventoryResult<()> {
        if self.items.contains_key(item.id()) {
            return Err(InventoryError::duplicate(item.id().clone()));
        }
        let id = item.id().clone();
        tracing::info!(item_id = %id, kind = %item.kind(), "adding item");
        self.items.insert(id.clone(), item);
        self.commit(id, None)
    }

    /// Remove an item and return it.
    pub fn remove(&mut self, item_id: &str) -> InventoryResult<Item> {
        let (id, item) = self
            .items
            .remove_entry(item_id)
            .ok_or_else(|| InventoryError::not_found(item_id))?;
        tracing::info!(item_id = %id, "removing item");
        self.commit(id, Some(item.clone()))?;
        Ok(item)
    }

    pub fn find(&self, item_id: &str) -> Option<&Item> {
        self.items.get(item_id)
    }

    /// Restock an item; returns the new quantity.
    pub fn restock(&mut self, item_id: &str, amount: i64) -> InventoryResult<u64> {
        self.adjust(item_id, |item| item.restock(amount))
    }

    /// Sell from an item's stock; returns the new quantity.
    pub fn sell(&mut self, item_id: &str, amount: i64) -> InventoryResult<u64> {
        self.adjust(item_id, |item| item.sell(amount))
    }

    pub fn list_all(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn list_by_type(&self, kind: ItemKind) -> impl Iterator<Item = &Item> {
        self.items.values().filter(move |item| item.kind() == kind)
    }

    pub fn total_value(&self) -> f64 {
        self.items.values().map(Item::total_value).sum()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn adjust(
        &mut self,
        item_id: &str,
        change: impl FnOnce(&mut Item) -> InventoryResult<()>,
    ) -> InventoryResult<u64> {
        let item = self
            .items
            .get_mut(item_id)
            .ok_or_else(|| InventoryError::not_found(item_id))?;
        let previous = item.clone();
        change(item)?;
        let quantity = item.quantity();
        tracing::info!(
            item_id = %previous.id(),
            from = previous.quantity(),
            to = quantity,
            "stock adjusted"
        );
        self.commit(previous.id().clone(), Some(previous))?;
        Ok(quantity)
    }

    /// Persist after a mutation of `id`; on failure put `previous` back
    /// (or drop the entry when there was none).
    fn commit(&mut self, id: ItemId, previous: Option<Item>) -> InventoryResult<()> {
        let Err(error) = self.save() else {
            return Ok(());
        };
        tracing::warn!(item_id = %id, %error, "save failed; reverting in-memory change");
        match previous {
            Some(item) => {
                self.items.insert(id, item);
            }
            None => {
                self.items.remove(&id);
            }
        }
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemAttributes;
    use crate::store::InMemoryStore;
    use serde_json::json;

    fn cpu(id: &str, quantity: i64, price: f64) -> Item {
        Item::new(
            id,
            "Ryzen 5",
            quantity,
            price,
            ItemAttributes::Cpu {
                socket_type: "AM5".into(),
            },
        )
        .unwrap()
    }

    fn monitor(id: &str, quantity: i64, price: f64) -> Item {
        Item::new(
            id,
            "UltraSharp",
            quantity,
            price,
            ItemAttributes::Monitor {
                screen_size_inches: 27.0,
            },
        )
        .unwrap()
    }

    fn empty_repository() -> InventoryRepository<InMemoryStore> {
        let (repository, report) = InventoryRepository::open(InMemoryStore::new());
        assert!(report.is_clean());
        repository
    }

    #[test]
    fn add_then_find_returns_the_item() {
        let mut repository = empty_repository();
        let item = cpu("C1", 10, 150.0);

        repository.add(item.clone()).unwrap();

        assert_eq!(repository.find("C1"), Some(&item));
        assert_eq!(repository.len(), 1);
        assert_eq!(repository.store().write_count(), 1);
    }

    #[test]
    fn duplicate_add_is_rejected_and_original_kept() {
        let mut repository = empty_repository();
        repository.add(cpu("C1", 10, 150.0)).unwrap();

        let err = repository.add(cpu("C1", 1, 1.0)).unwrap_err();

        assert_eq!(err, InventoryError::duplicate("C1"));
        let kept = repository.find("C1").unwrap();
        assert_eq!(kept.quantity(), 10);
        assert_eq!(kept.price(), 150.0);
        assert_eq!(repository.store().write_count(), 1);
    }

    #[test]
    fn remove_then_find_is_absent() {
        let mut repository = empty_repository();
        repository.add(cpu("C1", 10, 150.0)).unwrap();

        let removed = repository.remove("C1").unwrap();

        assert_eq!(removed.id().as_str(), "C1");
        assert!(repository.find("C1").is_none());
        assert!(repository.is_empty());
        assert_eq!(repository.store().records(), Some(vec![]));
    }

    #[test]
    fn operations_on_missing_ids_are_not_found() {
        let mut repository = empty_repository();
        assert_eq!(
            repository.remove("nope").unwrap_err(),
            InventoryError::not_found("nope")
        );
        assert_eq!(
            repository.restock("nope", 1).unwrap_err(),
            InventoryError::not_found("nope")
        );
        assert_eq!(
            repository.sell("nope", 1).unwrap_err(),
            InventoryError::not_found("nope")
        );
        assert_eq!(repository.store().write_count(), 0);
    }

    #[test]
    fn failed_sell_does_not_persist() {
        let mut repository = empty_repository();
        repository.add(cpu("C1", 6, 150.0)).unwrap();

        assert!(matches!(
            repository.sell("C1", 100),
            Err(InventoryError::Validation(_))
        ));
        assert_eq!(repository.find("C1").unwrap().quantity(), 6);
        assert_eq!(repository.store().write_count(), 1);
    }

    #[test]
    fn total_value_sums_items() {
        let mut repository = empty_repository();
        assert_eq!(repository.total_value(), 0.0);

        repository.add(cpu("C1", 2, 10.0)).unwrap();
        repository.add(monitor("M1", 3, 5.0)).unwrap();

        assert_eq!(repository.total_value(), 35.0);
    }

    #[test]
    fn list_by_type_filters_on_kind() {
        let mut repository = empty_repository();
        repository.add(cpu("C1", 1, 10.0)).unwrap();
        repository.add(cpu("C2", 1, 10.0)).unwrap();
        repository.add(monitor("M1", 1, 10.0)).unwrap();

        let cpus: Vec<_> = repository
            .list_by_type(ItemKind::Cpu)
            .map(|item| item.id().as_str())
            .collect();
        assert_eq!(cpus, vec!["C1", "C2"]);
        assert_eq!(repository.list_by_type(ItemKind::Storage).count(), 0);
        assert_eq!(repository.list_all().count(), 3);
    }

    #[test]
    fn sell_and_restock_scenario() {
        let mut repository = empty_repository();
        repository.add(cpu("C1", 10, 150.0)).unwrap();

        assert_eq!(repository.sell("C1", 4).unwrap(), 6);
        assert!(repository.sell("C1", 100).is_err());
        assert_eq!(repository.find("C1").unwrap().quantity(), 6);
        assert_eq!(repository.restock("C1", 5).unwrap(), 11);
        assert_eq!(repository.total_value(), 1650.0);

        let stored = repository.store().records().unwrap();
        assert_eq!(stored[0]["quantity"], 11);
    }

    #[test]
    fn failed_save_rolls_back_every_mutation() {
        let mut repository = empty_repository();
        repository.add(cpu("C1", 10, 150.0)).unwrap();
        repository.store().set_fail_writes(true);

        assert!(matches!(
            repository.add(cpu("C2", 1, 1.0)),
            Err(InventoryError::Persistence(_))
        ));
        assert!(repository.find("C2").is_none());

        assert!(matches!(
            repository.restock("C1", 5),
            Err(InventoryError::Persistence(_))
        ));
        assert!(matches!(
            repository.sell("C1", 5),
            Err(InventoryError::Persistence(_))
        ));
        assert_eq!(repository.find("C1").unwrap().quantity(), 10);

        assert!(matches!(
            repository.remove("C1"),
            Err(InventoryError::Persistence(_))
        ));
        assert!(repository.find("C1").is_some());
        assert_eq!(repository.len(), 1);
    }

    #[test]
    fn load_skips_unknown_records_and_reports_them() {
        let store = InMemoryStore::with_records(vec![
            cpu("C1", 3, 100.0).to_record(),
            json!({
                "type": "GPU",
                "item_id": "G1",
                "name": "RTX",
                "quantity": 1,
                "price": 500.0
            }),
        ]);

        let (repository, report) = InventoryRepository::open(store);

        assert_eq!(repository.len(), 1);
        assert!(repository.find("C1").is_some());
        assert_eq!(report.loaded, 1);
        assert_eq!(report.warnings.len(), 1);
        match &report.warnings[0] {
            LoadWarning::Record {
                index,
                item_id,
                error,
            } => {
                assert_eq!(*index, 1);
                assert_eq!(item_id.as_deref(), Some("G1"));
                assert!(matches!(error, InventoryError::UnknownType(_)));
            }
            other => panic!("expected record warning, got {other:?}"),
        }
    }

    #[test]
    fn load_keeps_first_of_duplicated_ids() {
        let store = InMemoryStore::with_records(vec![
            cpu("C1", 3, 100.0).to_record(),
            cpu("C1", 9, 1.0).to_record(),
        ]);

        let (repository, report) = InventoryRepository::open(store);

        assert_eq!(repository.find("C1").unwrap().quantity(), 3);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].to_string().contains("C1"));
    }
}
