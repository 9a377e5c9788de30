//! Backends that hold the persisted record document.
//!
//! Stores only move whole documents; turning records into items is the
//! repository's job (via the factory), so that one bad record never prevents
//! the rest of the document from loading.

use std::cell::{Cell, RefCell};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tempfile::NamedTempFile;

use supplies_core::{InventoryError, InventoryResult};

/// On-disk shape: `{ "items": [ <record>, ... ] }`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    items: Vec<JsonValue>,
}

/// Whole-document persistence for item records.
pub trait InventoryStore {
    /// Read every stored record.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet.
    fn read(&self) -> InventoryResult<Option<Vec<JsonValue>>>;

    /// Replace the stored document with `records`.
    fn write(&self, records: Vec<JsonValue>) -> InventoryResult<()>;

    /// Human-readable location, used in log lines.
    fn location(&self) -> String;
}

/// JSON file store.
///
/// Writes go to a temporary file in the target directory which is then renamed
/// over the target, so readers see either the old or the new document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl InventoryStore for JsonFileStore {
    fn read(&self) -> InventoryResult<Option<Vec<JsonValue>>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(InventoryError::persistence(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        let document: StoreDocument = serde_json::from_str(&contents).map_err(|e| {
            InventoryError::persistence(format!(
                "failed to decode JSON from {}: {e}",
                self.path.display()
            ))
        })?;

        tracing::debug!(
            path = %self.path.display(),
            records = document.items.len(),
            "read inventory document"
        );
        Ok(Some(document.items))
    }

    fn write(&self, records: Vec<JsonValue>) -> InventoryResult<()> {
        let document = StoreDocument { items: records };
        let mut bytes = serde_json::to_vec_pretty(&document)
            .map_err(|e| InventoryError::persistence(format!("failed to encode inventory: {e}")))?;
        bytes.push(b'\n');

        let dir = self.parent_dir();
        let io_err = |e: io::Error| {
            InventoryError::persistence(format!("failed to write {}: {e}", self.path.display()))
        };

        fs::create_dir_all(&dir).map_err(io_err)?;
        let mut temp_file = NamedTempFile::new_in(&dir).map_err(io_err)?;
        temp_file.write_all(&bytes).map_err(io_err)?;
        temp_file.as_file().sync_all().map_err(io_err)?;
        temp_file.persist(&self.path).map_err(|e| io_err(e.error))?;

        tracing::debug!(
            path = %self.path.display(),
            records = document.items.len(),
            "wrote inventory document"
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory store.
///
/// Intended for tests/dev. Writes can be made to fail on demand to exercise
/// persistence error paths.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RefCell<Option<Vec<JsonValue>>>,
    fail_writes: Cell<bool>,
    writes: Cell<usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing document, as if loaded from disk.
    pub fn with_records(records: Vec<JsonValue>) -> Self {
        Self {
            records: RefCell::new(Some(records)),
            ..Self::default()
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Snapshot of the last successfully written document.
    pub fn records(&self) -> Option<Vec<JsonValue>> {
        self.records.borrow().clone()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl InventoryStore for InMemoryStore {
    fn read(&self) -> InventoryResult<Option<Vec<JsonValue>>> {
        Ok(self.records.borrow().clone())
    }

    fn write(&self, records: Vec<JsonValue>) -> InventoryResult<()> {
        if self.fail_writes.get() {
            return Err(InventoryError::persistence("in-memory store rejected write"));
        }
        *self.records.borrow_mut() = Some(records);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
