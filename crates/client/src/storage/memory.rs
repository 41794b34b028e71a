//! In-process credential store.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

use super::CredentialStore;

struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// In-memory credential store with per-entry expiry.
///
/// The default backend when no durable path is configured, and the store of
/// choice in tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn put(&self, key: &str, value: &str, ttl_minutes: i64) {
        let entry = Entry {
            value: value.to_string(),
            expires_at: Utc::now() + Duration::minutes(ttl_minutes),
        };
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), entry);
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(key)?;
        if entry.expires_at <= Utc::now() {
            return None;
        }
        Some(entry.value.clone())
    }

    fn erase(&self, key: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
    }
}
