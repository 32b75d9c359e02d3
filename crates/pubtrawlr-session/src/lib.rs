pub mod migrations;
pub mod sqlite;
pub mod store;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use pubtrawlr_types::Identity;

pub use sqlite::SqliteStore;
pub use store::{KeyValueStore, MemoryStore};

const KEY_TOKEN: &str = "token";
const KEY_USER_ID: &str = "user_id";
const KEY_USER_NAME: &str = "user_name";
const KEY_USER_PHOTO: &str = "user_photo";

const ALL_KEYS: [&str; 4] = [KEY_TOKEN, KEY_USER_ID, KEY_USER_NAME, KEY_USER_PHOTO];

/// Bearer token and identity of the signed-in user.
///
/// Handed to every client that needs authentication. Clones share the same
/// backing store.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn KeyValueStore>,
}

impl Session {
    pub fn with_store(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    /// Open (or create) a session persisted at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::with_store(Arc::new(SqliteStore::open(path)?)))
    }

    /// The stored bearer token. An empty token counts as no token.
    pub fn token(&self) -> Option<String> {
        self.read(KEY_TOKEN).filter(|t| !t.is_empty())
    }

    /// The identity stored next to the token, if all of its fields are present.
    pub fn identity(&self) -> Option<Identity> {
        let user_id = self.read(KEY_USER_ID)?;
        let user_id = match user_id.parse() {
            Ok(id) => id,
            Err(e) => {
                warn!("Corrupt user_id '{}' in session store: {}", user_id, e);
                return None;
            }
        };

        Some(Identity {
            user_id,
            user_name: self.read(KEY_USER_NAME)?,
            user_photo: self.read(KEY_USER_PHOTO)?,
        })
    }

    /// Replace the token and identity in a single write.
    pub fn replace(&self, token: &str, identity: &Identity) -> Result<()> {
        self.store.set_all(&[
            (KEY_TOKEN, token.to_string()),
            (KEY_USER_ID, identity.user_id.to_string()),
            (KEY_USER_NAME, identity.user_name.clone()),
            (KEY_USER_PHOTO, identity.user_photo.clone()),
        ])
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove_all(&ALL_KEYS)
    }

    fn read(&self, key: &str) -> Option<String> {
        self.store.get(key).unwrap_or_else(|e| {
            warn!("Session store read of '{}' failed: {}", key, e);
            None
        })
    }
}
