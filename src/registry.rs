//! Local registry of known MCP servers, backed by a JSON file.

use std::path::PathBuf;

use serde_json::error::Category;
use serde_json::Value;

use crate::json_file::{self, JsonFileError};
use crate::models::{RegistrySettings, ServerRecord};

/// Whether `upsert` added a new record or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

/// Registry state for one process. Constructed once and passed to operations,
/// which call [`RegistryStore::load`] to pick up on-disk changes before reading.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    path: PathBuf,
    settings: RegistrySettings,
}

impl RegistryStore {
    /// Create an empty, not yet loaded store for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            settings: RegistrySettings::default(),
        }
    }

    /// Create a store and load it from disk.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let mut store = Self::new(path);
        store.load()?;
        Ok(store)
    }

    /// Reload from disk.
    ///
    /// A missing file or one that is not valid JSON is replaced by an empty
    /// registry, which is persisted immediately. Valid JSON of the wrong shape
    /// keeps every record that still deserializes and leaves the file alone.
    /// Any other read failure is logged and leaves an empty in-memory registry
    /// without touching the file. Only the persist step can fail.
    pub fn load(&mut self) -> Result<(), RegistryError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "registry missing, creating empty one");
                self.settings = RegistrySettings::default();
                return self.save();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read registry");
                self.settings = RegistrySettings::default();
                return Ok(());
            }
        };

        match serde_json::from_str::<RegistrySettings>(&content) {
            Ok(settings) => {
                tracing::debug!(servers = settings.servers.len(), "registry loaded");
                self.settings = settings;
                Ok(())
            }
            Err(e) if e.classify() == Category::Data => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "registry has malformed entries, keeping the valid ones"
                );
                self.settings = RegistrySettings {
                    servers: salvage_records(&content),
                };
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "registry is not valid JSON, resetting to empty"
                );
                self.settings = RegistrySettings::default();
                self.save()
            }
        }
    }

    /// Persist the in-memory registry as pretty JSON.
    pub fn save(&self) -> Result<(), RegistryError> {
        json_file::write_pretty(&self.path, &self.settings).map_err(RegistryError::Save)
    }

    pub fn servers(&self) -> &[ServerRecord] {
        &self.settings.servers
    }

    /// Case-insensitive substring match on `name`. When several records match,
    /// the first one in registry order wins.
    pub fn find(&self, query: &str) -> Option<&ServerRecord> {
        let index = self.find_index(query)?;
        self.settings.servers.get(index)
    }

    /// Mutable form of [`RegistryStore::find`].
    pub fn find_mut(&mut self, query: &str) -> Option<&mut ServerRecord> {
        let index = self.find_index(query)?;
        self.settings.servers.get_mut(index)
    }

    /// Exact-name lookup.
    pub fn get(&self, name: &str) -> Option<&ServerRecord> {
        self.settings.servers.iter().find(|s| s.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ServerRecord> {
        self.settings.servers.iter_mut().find(|s| s.name == name)
    }

    /// Insert `record`, or replace the record with the same name wholesale.
    pub fn upsert(&mut self, record: ServerRecord) -> Upsert {
        match self.get_mut(&record.name) {
            Some(existing) => {
                *existing = record;
                Upsert::Updated
            }
            None => {
                self.settings.servers.push(record);
                Upsert::Inserted
            }
        }
    }

    /// Remove the record with exactly this name. Returns whether one was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.settings.servers.len();
        self.settings.servers.retain(|s| s.name != name);
        self.settings.servers.len() != before
    }

    fn find_index(&self, query: &str) -> Option<usize> {
        let needle = query.to_lowercase();
        self.settings
            .servers
            .iter()
            .position(|s| s.name.to_lowercase().contains(&needle))
    }
}

/// Records from a syntactically valid registry whose shape is off. Entries that
/// do not deserialize are skipped one by one.
fn salvage_records(content: &str) -> Vec<ServerRecord> {
    let servers = serde_json::from_str::<Value>(content)
        .ok()
        .and_then(|mut v| v.get_mut("servers").map(Value::take));
    let Some(Value::Array(entries)) = servers else {
        return Vec::new();
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| match serde_json::from_value(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(index = i, error = %e, "skipping malformed registry entry");
                None
            }
        })
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Failed to save registry: {0}")]
    Save(#[source] JsonFileError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> ServerRecord {
        ServerRecord {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn find_prefers_first_partial_match() {
        let mut store = RegistryStore::new("/nonexistent/registry.json");
        store.upsert(record("@scope/server-git"));
        store.upsert(record("@scope/server-github"));

        assert_eq!(store.find("GIT").unwrap().name, "@scope/server-git");
        assert_eq!(store.find("github").unwrap().name, "@scope/server-github");
        assert!(store.find("slack").is_none());
    }

    #[test]
    fn upsert_reports_insert_then_update() {
        let mut store = RegistryStore::new("/nonexistent/registry.json");
        assert_eq!(store.upsert(record("a")), Upsert::Inserted);
        assert_eq!(store.upsert(record("a")), Upsert::Updated);
        assert_eq!(store.servers().len(), 1);
    }
}
