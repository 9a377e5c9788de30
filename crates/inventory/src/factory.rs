//! Reconstruct items from generic records.
//!
//! A record is the untyped JSON object produced by [`Item::to_record`]. The
//! `type` tag selects the variant; every other field is decoded with serde so
//! that missing or mistyped fields are reported per record.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use supplies_core::{InventoryError, InventoryResult};

use crate::item::{Item, ItemAttributes, ItemKind};

#[derive(Deserialize)]
struct CommonFields {
    item_id: String,
    name: String,
    quantity: i64,
    price: f64,
}

#[derive(Deserialize)]
struct CpuFields {
    socket_type: String,
}

#[derive(Deserialize)]
struct CapacityFields {
    capacity_gb: u32,
}

#[derive(Deserialize)]
struct MonitorFields {
    screen_size_inches: f64,
}

#[derive(Deserialize)]
struct PeripheralFields {
    device_type: String,
}

/// Build an [`Item`] from a stored record.
///
/// Fails with `UnknownType` when the tag is missing or unrecognized or when a
/// required field is absent or of the wrong JSON type, and with `Validation`
/// when the decoded values break an item invariant.
pub fn from_record(record: &Value) -> InventoryResult<Item> {
    let tag = record
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| InventoryError::unknown_type("record has no string `type` tag"))?;
    let kind: ItemKind = tag.parse()?;

    let common: CommonFields = decode(record, kind)?;
    let attributes = match kind {
        ItemKind::Cpu => {
            let fields: CpuFields = decode(record, kind)?;
            ItemAttributes::Cpu {
                socket_type: fields.socket_type,
            }
        }
        ItemKind::Ram => {
            let fields: CapacityFields = decode(record, kind)?;
            ItemAttributes::Ram {
                capacity_gb: fields.capacity_gb,
            }
        }
        ItemKind::Monitor => {
            let fields: MonitorFields = decode(record, kind)?;
            ItemAttributes::Monitor {
                screen_size_inches: fields.screen_size_inches,
            }
        }
        ItemKind::Storage => {
            let fields: CapacityFields = decode(record, kind)?;
            ItemAttributes::Storage {
                capacity_gb: fields.capacity_gb,
            }
        }
        ItemKind::Peripheral => {
            let fields: PeripheralFields = decode(record, kind)?;
            ItemAttributes::Peripheral {
                device_type: fields.device_type,
            }
        }
    };

    Item::new(
        common.item_id,
        common.name,
        common.quantity,
        common.price,
        attributes,
    )
}

fn decode<T: DeserializeOwned>(record: &Value, kind: ItemKind) -> InventoryResult<T> {
    T::deserialize(record)
        .map_err(|e| InventoryError::unknown_type(format!("invalid {kind} record: {e}")))
}
