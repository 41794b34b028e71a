//! File-backed credential store.
//!
//! Persists entries as one JSON document with base64-obfuscated values, so
//! tokens are not grep-able plaintext on disk. This is obfuscation, not
//! encryption; the file should carry restrictive permissions.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::CredentialStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    /// Base64-encoded value.
    value: String,
    expires_at: DateTime<Utc>,
}

/// Durable credential store backed by a single JSON file.
///
/// An unreadable or corrupt file degrades to an empty store; writes that
/// fail are logged and dropped rather than surfaced, matching the contract
/// that storage faults never reach callers.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, StoredEntry>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        let entries = Self::load(&path);
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn load(path: &Path) -> HashMap<String, StoredEntry> {
        if !path.exists() {
            return HashMap::new();
        }
        let Ok(file) = File::open(path) else {
            return HashMap::new();
        };
        serde_json::from_reader(BufReader::new(file)).unwrap_or_default()
    }

    fn flush(&self, entries: &HashMap<String, StoredEntry>) {
        if let Some(parent) = self.path.parent()
            && !parent.exists()
            && fs::create_dir_all(parent).is_err()
        {
            tracing::warn!(path = %self.path.display(), "failed to create credential dir");
            return;
        }
        let Ok(file) = File::create(&self.path) else {
            tracing::warn!(path = %self.path.display(), "failed to write credential file");
            return;
        };
        let mut writer = BufWriter::new(file);
        if serde_json::to_writer_pretty(&mut writer, entries).is_err() || writer.flush().is_err() {
            tracing::warn!(path = %self.path.display(), "failed to flush credential file");
        }
    }
}

impl CredentialStore for FileStore {
    fn put(&self, key: &str, value: &str, ttl_minutes: i64) {
        let entry = StoredEntry {
            value: STANDARD.encode(value),
            expires_at: Utc::now() + Duration::minutes(ttl_minutes),
        };
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), entry);
            self.flush(&entries);
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().ok()?;
        let entry = entries.get(key)?;
        if entry.expires_at <= Utc::now() {
            return None;
        }
        let bytes = STANDARD.decode(&entry.value).ok()?;
        String::from_utf8(bytes).ok()
    }

    fn erase(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock()
            && entries.remove(key).is_some()
        {
            self.flush(&entries);
        }
    }
}
