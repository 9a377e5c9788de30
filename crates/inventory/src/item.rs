use core::fmt;
use core::str::FromStr;
use std::io;

use serde_json::{Map, Value};

use supplies_core::{InventoryError, InventoryResult, ItemId};

/// Variant tag of a supply item.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemKind {
    Cpu,
    Ram,
    Monitor,
    Storage,
    Peripheral,
}

impl ItemKind {
    pub const ALL: [ItemKind; 5] = [
        ItemKind::Cpu,
        ItemKind::Ram,
        ItemKind::Monitor,
        ItemKind::Storage,
        ItemKind::Peripheral,
    ];

    /// Canonical tag as written to the `type` field of a record.
    pub fn tag(self) -> &'static str {
        match self {
            ItemKind::Cpu => "CPU",
            ItemKind::Ram => "RAM",
            ItemKind::Monitor => "Monitor",
            ItemKind::Storage => "Storage",
            ItemKind::Peripheral => "Peripheral",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Case-insensitive: `cpu`, `CPU` and `Cpu` all parse to [`ItemKind::Cpu`].
impl FromStr for ItemKind {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemKind::ALL
            .into_iter()
            .find(|kind| kind.tag().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| InventoryError::unknown_type(format!("unknown item type '{s}'")))
    }
}

/// Per-variant attribute carried by every item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemAttributes {
    Cpu { socket_type: String },
    Ram { capacity_gb: u32 },
    Monitor { screen_size_inches: f64 },
    Storage { capacity_gb: u32 },
    Peripheral { device_type: String },
}

impl ItemAttributes {
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemAttributes::Cpu { .. } => ItemKind::Cpu,
            ItemAttributes::Ram { .. } => ItemKind::Ram,
            ItemAttributes::Monitor { .. } => ItemKind::Monitor,
            ItemAttributes::Storage { .. } => ItemKind::Storage,
            ItemAttributes::Peripheral { .. } => ItemKind::Peripheral,
        }
    }

    fn validate(&self) -> InventoryResult<()> {
        match self {
            ItemAttributes::Monitor { screen_size_inches }
                if !(screen_size_inches.is_finite() && *screen_size_inches > 0.0) =>
            {
                Err(InventoryError::validation(
                    "screen size must be a positive number",
                ))
            }
            _ => Ok(()),
        }
    }

    /// Record key and JSON value of the attribute.
    fn record_field(&self) -> (&'static str, Value) {
        match self {
            ItemAttributes::Cpu { socket_type } => ("socket_type", Value::from(socket_type.as_str())),
            ItemAttributes::Ram { capacity_gb } => ("capacity_gb", Value::from(*capacity_gb)),
            ItemAttributes::Monitor { screen_size_inches } => {
                ("screen_size_inches", Value::from(*screen_size_inches))
            }
            ItemAttributes::Storage { capacity_gb } => ("capacity_gb", Value::from(*capacity_gb)),
            ItemAttributes::Peripheral { device_type } => {
                ("device_type", Value::from(device_type.as_str()))
            }
        }
    }

    fn fmt_detail(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemAttributes::Cpu { socket_type } => write!(f, "Socket Type: {socket_type}"),
            ItemAttributes::Ram { capacity_gb } | ItemAttributes::Storage { capacity_gb } => {
                write!(f, "Capacity: {capacity_gb} GB")
            }
            ItemAttributes::Monitor { screen_size_inches } => {
                write!(f, "Screen Size: {screen_size_inches} inches")
            }
            ItemAttributes::Peripheral { device_type } => write!(f, "Device Type: {device_type}"),
        }
    }
}

/// Largest stock level an item can hold. Records store quantity as a signed
/// JSON integer, so the in-memory value stays within `i64`.
pub const MAX_QUANTITY: u64 = i64::MAX as u64;

/// A supply item: shared validated fields plus one variant attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    id: ItemId,
    name: String,
    quantity: u64,
    price: f64,
    attributes: ItemAttributes,
}

impl Item {
    /// Build a validated item.
    ///
    /// `quantity` is signed so that negative input from callers is reported as
    /// a validation failure instead of being unrepresentable upstream.
    pub fn new(
        item_id: impl Into<String>,
        name: impl Into<String>,
        quantity: i64,
        price: f64,
        attributes: ItemAttributes,
    ) -> InventoryResult<Self> {
        let id = ItemId::parse(item_id)?;
        let name = name.into();
        if name.trim().is_empty() {
            return Err(InventoryError::validation("item name cannot be empty"));
        }
        let quantity = u64::try_from(quantity).map_err(|_| {
            InventoryError::validation("quantity must be a non-negative integer")
        })?;
        if !(price.is_finite() && price > 0.0) {
            return Err(InventoryError::validation("price must be a positive number"));
        }
        attributes.validate()?;

        Ok(Self {
            id,
            name,
            quantity,
            price,
            attributes,
        })
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn kind(&self) -> ItemKind {
        self.attributes.kind()
    }

    pub fn attributes(&self) -> &ItemAttributes {
        &self.attributes
    }

    /// Add `amount` units to stock.
    pub fn restock(&mut self, amount: i64) -> InventoryResult<()> {
        let amount = positive_amount(amount, "restock")?;
        self.quantity = self
            .quantity
            .checked_add(amount)
            .filter(|quantity| *quantity <= MAX_QUANTITY)
            .ok_or_else(|| InventoryError::validation("restock would overflow quantity"))?;
        Ok(())
    }

    /// Remove `amount` units from stock; never takes quantity below zero.
    pub fn sell(&mut self, amount: i64) -> InventoryResult<()> {
        let amount = positive_amount(amount, "sell")?;
        if amount > self.quantity {
            return Err(InventoryError::validation(format!(
                "insufficient stock for '{}': requested {amount}, available {}",
                self.id, self.quantity
            )));
        }
        self.quantity -= amount;
        Ok(())
    }

    pub fn total_value(&self) -> f64 {
        self.quantity as f64 * self.price
    }

    /// Generic record form: `type` tag, common fields, variant attribute.
    pub fn to_record(&self) -> Value {
        let mut record = Map::new();
        record.insert("type".into(), Value::from(self.kind().tag()));
        record.insert("item_id".into(), Value::from(self.id.as_str()));
        record.insert("name".into(), Value::from(self.name.as_str()));
        record.insert("quantity".into(), Value::from(self.quantity));
        record.insert("price".into(), Value::from(self.price));
        let (key, value) = self.attributes.record_field();
        record.insert(key.into(), value);
        Value::Object(record)
    }

    /// Write the multi-line rendering of this item to `out`.
    pub fn describe<W: io::Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{self}")
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ID: {}", self.id)?;
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Type: {}", self.kind())?;
        writeln!(f, "Quantity: {}", self.quantity)?;
        writeln!(f, "Price: ${:.2}", self.price)?;
        self.attributes.fmt_detail(f)?;
        writeln!(f)?;
        write!(f, "Total Value: ${:.2}", self.total_value())
    }
}

fn positive_amount(amount: i64, operation: &str) -> InventoryResult<u64> {
    if amount <= 0 {
        return Err(InventoryError::validation(format!(
            "{operation} amount must be a positive integer"
        )));
    }
    Ok(amount as u64)
}
