//! Client-side preferences with expiry.
//!
//! Entries carry their own expiry time and are written back to a TOML file
//! whenever they change:
//!
//! ```toml
//! [show_advanced_config]
//! value = "1"
//! expires = "2026-11-15T10:00:00Z"
//! ```

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PrefsError;

/// Preference controlling whether advanced items are shown.
pub const SHOW_ADVANCED_KEY: &str = "show_advanced_config";

/// Lifetime of a preference after it was last written, in days.
pub const PREF_TTL_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PrefEntry {
    value: String,
    expires: DateTime<Utc>,
}

/// Persisted key/value preferences.
#[derive(Debug, Clone, Default)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
    entries: BTreeMap<String, PrefEntry>,
}

impl PreferenceStore {
    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load preferences from `path`. A missing file yields an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PrefsError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path: Some(path),
            entries,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_bool_at(key, Utc::now())
    }

    /// Read a flag as of `now`; expired entries read as absent.
    pub fn get_bool_at(&self, key: &str, now: DateTime<Utc>) -> Option<bool> {
        let entry = self.entries.get(key)?;
        if entry.expires <= now {
            debug!("preference {key} expired at {}", entry.expires);
            return None;
        }
        Some(entry.value == "1")
    }

    pub fn set_bool(&mut self, key: &str, value: bool) -> Result<(), PrefsError> {
        self.set_bool_at(key, value, Utc::now())
    }

    /// Store a flag that expires [`PREF_TTL_DAYS`] after `now`, then persist.
    ///
    /// The store is left unchanged when the file cannot be written.
    pub fn set_bool_at(
        &mut self,
        key: &str,
        value: bool,
        now: DateTime<Utc>,
    ) -> Result<(), PrefsError> {
        let previous = self.entries.insert(
            key.to_string(),
            PrefEntry {
                value: if value { "1" } else { "0" }.to_string(),
                expires: now + TimeDelta::days(PREF_TTL_DAYS),
            },
        );
        if let Err(e) = self.save() {
            match previous {
                Some(entry) => self.entries.insert(key.to_string(), entry),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn save(&self) -> Result<(), PrefsError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let content = toml::to_string_pretty(&self.entries)?;
        fs::write(path, content)?;
        Ok(())
    }
}
