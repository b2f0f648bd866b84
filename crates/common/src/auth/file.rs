//! File-backed credential storage
//!
//! Persists credentials as a small JSON document so a token survives process
//! restarts, the same way a browser's local store survives page reloads.
//! Writes go to a sibling temporary file that is renamed over the original,
//! so a crash never leaves a half-written document behind.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::backend::{CredentialBackend, CredentialError};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    value: String,
    stored_at: DateTime<Utc>,
}

type Document = BTreeMap<String, StoredEntry>;

/// Credential backend persisting to a JSON file.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileBackend {
    /// Create a backend writing to `path`. The file and its parent
    /// directories are created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When the value under `key` was last written.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn stored_at(&self, key: &str) -> Result<Option<DateTime<Utc>>, CredentialError> {
        let _guard = self.lock.lock();
        Ok(self.load()?.get(key).map(|entry| entry.stored_at))
    }

    fn load(&self) -> Result<Document, CredentialError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(Document::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Document::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, document: &Document) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, serde_json::to_vec_pretty(document)?)?;
        fs::rename(&tmp_path, &self.path)?;

        debug!(path = %self.path.display(), entries = document.len(), "Credential file written");
        Ok(())
    }
}

impl CredentialBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, CredentialError> {
        let _guard = self.lock.lock();
        Ok(self.load()?.remove(key).map(|entry| entry.value))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        let _guard = self.lock.lock();
        let mut document = self.load()?;
        let entry = StoredEntry { value: value.to_string(), stored_at: Utc::now() };
        document.insert(key.to_string(), entry);
        self.save(&document)
    }

    fn remove(&self, key: &str) -> Result<(), CredentialError> {
        let _guard = self.lock.lock();
        let mut document = self.load()?;
        if document.remove(key).is_none() {
            return Ok(());
        }
        self.save(&document)
    }
}
