//! Local persistent storage for the theme and the last conversion.
//!
//! Values are stored as JSON strings under fixed keys, one key per concern,
//! so writers never need to coordinate.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Key holding the serialized [`Theme`].
pub const THEME_KEY: &str = "theme";

/// Key holding the serialized [`PersistedConversion`].
pub const LAST_CONVERSION_KEY: &str = "lastConversion";

/// Storage failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// String key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value for `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Write the raw value for `key`.
    fn set(&self, key: &str, value: String) -> StorageResult<()>;
}

/// Store backed by a JSON object file.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`. A missing file opens as empty.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), entries = entries.len(), "Opened storage");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> StorageResult<()> {
        let mut entries = self.entries.lock();
        let mut updated = entries.clone();
        updated.insert(key.to_string(), value);
        self.flush(&updated)?;
        *entries = updated;
        Ok(())
    }
}

/// In-process store.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> StorageResult<()> {
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }
}

/// Snapshot of the last successful conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedConversion {
    pub from_currency: String,
    pub to_currency: String,
    /// Amount exactly as entered.
    pub amount: String,
    pub converted_amount: f64,
    pub rate: f64,
    /// When the conversion was saved.
    pub timestamp: DateTime<Utc>,
}

/// Display theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

fn load_json<T: for<'de> Deserialize<'de>>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key = %key, error = %e, "Ignoring malformed stored value");
            None
        }
    }
}

fn save_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> StorageResult<()> {
    store.set(key, serde_json::to_string(value)?)
}

/// Read the persisted last conversion, if any.
pub fn load_last_conversion(store: &dyn KeyValueStore) -> Option<PersistedConversion> {
    // `null` is a valid stored value meaning "none".
    load_json::<Option<PersistedConversion>>(store, LAST_CONVERSION_KEY).flatten()
}

/// Overwrite the persisted last conversion.
pub fn save_last_conversion(
    store: &dyn KeyValueStore,
    conversion: &PersistedConversion,
) -> StorageResult<()> {
    save_json(store, LAST_CONVERSION_KEY, conversion)
}

/// Read the persisted theme, defaulting to light.
pub fn load_theme(store: &dyn KeyValueStore) -> Theme {
    load_json(store, THEME_KEY).unwrap_or_default()
}

/// Persist the theme.
pub fn save_theme(store: &dyn KeyValueStore, theme: Theme) -> StorageResult<()> {
    save_json(store, THEME_KEY, &theme)
}
