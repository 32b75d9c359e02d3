use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{Result, anyhow};

/// Key/value backend for session state.
///
/// `set_all` and `remove_all` must apply every entry or none of them, so a
/// token is never observed next to the identity of a previous token.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set_all(&self, entries: &[(&str, String)]) -> Result<()>;
    fn remove_all(&self, keys: &[&str]) -> Result<()>;
}

/// Process-local store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|e| anyhow!("Store lock poisoned: {}", e))?;
        Ok(entries.get(key).cloned())
    }

    fn set_all(&self, new_entries: &[(&str, String)]) -> Result<()> {
        let mut entries = self.entries.write().map_err(|e| anyhow!("Store lock poisoned: {}", e))?;
        for (key, value) in new_entries {
            entries.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> Result<()> {
        let mut entries = self.entries.write().map_err(|e| anyhow!("Store lock poisoned: {}", e))?;
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}
