//! UI state that lives outside the itinerary document.
//!
//! The presentation layer owns a `StateStore`: open flags keyed by node key and
//! done flags keyed by stop persistence id. The builder only reads it for
//! initial values; changes flow back through `PersistenceHooks`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::itinerary::view_models::NodeKey;

/// Change notifications for the two mutable UI flags.
///
/// Fire-and-forget: the caller never waits on or inspects the outcome.
pub trait PersistenceHooks {
    /// `stop_id` is the stop's source id, or its positional node key when the
    /// id is missing or already taken.
    fn on_stop_done_changed(&mut self, stop_id: &str, done: bool);

    fn on_node_open_changed(&mut self, key: &NodeKey, open: bool);
}

/// Hooks that drop every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPersistence;

impl PersistenceHooks for NoopPersistence {
    fn on_stop_done_changed(&mut self, _stop_id: &str, _done: bool) {}

    fn on_node_open_changed(&mut self, _key: &NodeKey, _open: bool) {}
}

/// Persisted open/done flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateStore {
    #[serde(default)]
    open: FxHashMap<NodeKey, bool>,
    #[serde(default)]
    done: FxHashMap<String, bool>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, key: &NodeKey) -> Option<bool> {
        self.open.get(key).copied()
    }

    pub fn done(&self, stop_id: &str) -> Option<bool> {
        self.done.get(stop_id).copied()
    }

    pub fn set_open(&mut self, key: NodeKey, open: bool) {
        self.open.insert(key, open);
    }

    pub fn set_done(&mut self, stop_id: impl Into<String>, done: bool) {
        self.done.insert(stop_id.into(), done);
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty() && self.done.is_empty()
    }

    pub fn clear(&mut self) {
        self.open.clear();
        self.done.clear();
    }

    /// Load a store from a JSON file. A missing file gives an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No state file at {}, starting empty", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file {}", path.display()))?;
        let store = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse state file {}", path.display()))?;
        Ok(store)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write state file {}", path.display()))?;
        Ok(())
    }
}

impl PersistenceHooks for StateStore {
    fn on_stop_done_changed(&mut self, stop_id: &str, done: bool) {
        self.set_done(stop_id, done);
    }

    fn on_node_open_changed(&mut self, key: &NodeKey, open: bool) {
        self.set_open(key.clone(), open);
    }
}
