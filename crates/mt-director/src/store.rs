//! Snapshot persistence.
//!
//! A store holds at most one snapshot in a single fixed slot. An empty slot
//! (or an explicit `null`) means no test is running.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use mt_core::MontageSnapshot;

use crate::error::StoreError;

/// Somewhere to keep the current montage snapshot.
pub trait SnapshotStore {
    /// Read the stored snapshot, if any.
    fn load(&self) -> Result<Option<MontageSnapshot>, StoreError>;

    /// Replace the stored snapshot. `None` clears the slot.
    fn save(&mut self, snapshot: Option<&MontageSnapshot>) -> Result<(), StoreError>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Option<MontageSnapshot>,
    saves: usize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `snapshot`.
    pub fn with_snapshot(snapshot: MontageSnapshot) -> Self {
        Self {
            slot: Some(snapshot),
            saves: 0,
        }
    }

    /// The stored snapshot.
    pub fn snapshot(&self) -> Option<&MontageSnapshot> {
        self.slot.as_ref()
    }

    /// How many times `save` was called.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<MontageSnapshot>, StoreError> {
        Ok(self.slot.clone())
    }

    fn save(&mut self, snapshot: Option<&MontageSnapshot>) -> Result<(), StoreError> {
        self.slot = snapshot.cloned();
        self.saves += 1;
        Ok(())
    }
}

/// Store backed by one JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Use the file at `path`. It need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file each save is written to before it replaces the slot.
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("montage"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<MontageSnapshot>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let trimmed = content.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }
        Ok(Some(MontageSnapshot::from_json(trimmed)?))
    }

    fn save(&mut self, snapshot: Option<&MontageSnapshot>) -> Result<(), StoreError> {
        let content = match snapshot {
            Some(s) => s.to_json()?,
            None => "null".to_string(),
        };
        // Replace the slot in one rename so a torn write never reaches it.
        let staging = self.staging_path();
        fs::write(&staging, content + "\n")?;
        if let Err(e) = fs::rename(&staging, &self.path) {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }
        Ok(())
    }
}
