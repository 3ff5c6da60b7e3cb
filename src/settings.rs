//! Hierarchical key/value settings store
//!
//! Dialogs remember their selections between sessions in a store scoped to
//! the project. Keys are dotted paths
//! (`receiveFileFromTranslator.fileGroupsListBox`) and map onto nested JSON
//! objects, so related values end up grouped in the file:
//!
//! ```json
//! { "version": 1, "values": { "receiveFileFromTranslator": { "fileGroupsListBox": {} } } }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Persistent hierarchical settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsStore {
    /// Version for settings file format compatibility
    version: u32,

    /// Nested values
    values: Map<String, Value>,

    /// Backing file, if any
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore {
    /// Current settings file format version
    const VERSION: u32 = 1;

    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            values: Map::new(),
            path: None,
        }
    }

    /// Load a store from `path`, or start empty if the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(?path, "Settings file does not exist, starting empty");
            return Ok(Self {
                path: Some(path.to_path_buf()),
                ..Self::new()
            });
        }

        let file = File::open(path)
            .map_err(|e| Error::Settings(format!("Failed to open settings file: {}", e)))?;
        let reader = BufReader::new(file);

        let mut store: Self = serde_json::from_reader(reader)
            .map_err(|e| Error::Settings(format!("Failed to parse settings file: {}", e)))?;

        if store.version != Self::VERSION {
            warn!(
                settings_version = store.version,
                current_version = Self::VERSION,
                "Settings file version mismatch, starting fresh"
            );
            store = Self::new();
        }

        store.path = Some(path.to_path_buf());
        info!(?path, keys = store.values.len(), "Loaded settings");
        Ok(store)
    }

    /// Save to the file this store was loaded from
    pub fn save(&self) -> Result<()> {
        match &self.path {
            Some(path) => self.save_to(path),
            None => Ok(()),
        }
    }

    /// Save to `path` atomically
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = path.with_extension("tmp");

        let file = File::create(&temp_path).map_err(|e| {
            Error::Settings(format!("Failed to create temp settings file: {}", e))
        })?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| Error::Settings(format!("Failed to write settings file: {}", e)))?;

        fs::rename(&temp_path, path)
            .map_err(|e| Error::Settings(format!("Failed to rename temp settings file: {}", e)))?;

        debug!(?path, "Saved settings");
        Ok(())
    }

    /// Backing file path
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Look up the value at a dotted key
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut segments = key.split('.');
        let first = segments.next()?;
        let mut current = self.values.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// String value at a dotted key
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Store a value at a dotted key, creating intermediate objects
    ///
    /// A non-object value sitting on the path is replaced by an object.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let segments: Vec<&str> = key.split('.').collect();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut current = &mut self.values;
        for segment in parents {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = match entry {
                Value::Object(map) => map,
                _ => return,
            };
        }

        current.insert(last.to_string(), value.into());
    }
}
