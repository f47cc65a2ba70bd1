use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::models::{default_roster, ChatMessage, UserProfile, WeeklyReport, Worker};

const WORKERS_KEY: &str = "workers.json";
const REPORTS_KEY: &str = "reports.json";
const USERS_KEY: &str = "users.json";
const CHAT_KEY: &str = "chat.json";
const SESSION_KEY: &str = "session.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Local key-value blob store: one JSON file per logical key under the data
/// directory. Whole blobs are rewritten on every save. There is no
/// cross-process locking; if two processes write the same key, the last
/// write wins silently.
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn open(root: impl Into<PathBuf>) -> Result<Store, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Store { root })
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn read_blob<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let path = self.root.join(key);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn write_blob<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let path = self.root.join(key);
        let raw = serde_json::to_string_pretty(value)?;
        fs::write(path, raw)?;
        Ok(())
    }

    /// Reads a blob, falling back to `default` when the key is missing or
    /// the stored JSON no longer parses. A fallback on bad data is reported
    /// on stderr; no partial recovery is attempted.
    fn read_or_default<T: DeserializeOwned>(&self, key: &str, default: impl FnOnce() -> T) -> T {
        match self.read_blob(key) {
            Ok(Some(value)) => value,
            Ok(None) => default(),
            Err(err) => {
                eprintln!("warning: could not read {key} ({err}); using defaults");
                default()
            }
        }
    }

    pub fn load_workers(&self) -> Vec<Worker> {
        self.read_or_default(WORKERS_KEY, default_roster)
    }

    pub fn save_workers(&self, workers: &[Worker]) -> Result<(), StoreError> {
        self.write_blob(WORKERS_KEY, &workers)
    }

    pub fn workers_blob_exists(&self) -> bool {
        self.root.join(WORKERS_KEY).exists()
    }

    pub fn load_reports(&self) -> Vec<WeeklyReport> {
        self.read_or_default(REPORTS_KEY, Vec::new)
    }

    pub fn save_reports(&self, reports: &[WeeklyReport]) -> Result<(), StoreError> {
        self.write_blob(REPORTS_KEY, &reports)
    }

    pub fn load_users(&self) -> Vec<UserProfile> {
        self.read_or_default(USERS_KEY, Vec::new)
    }

    pub fn save_users(&self, users: &[UserProfile]) -> Result<(), StoreError> {
        self.write_blob(USERS_KEY, &users)
    }

    pub fn load_chat(&self) -> Vec<ChatMessage> {
        self.read_or_default(CHAT_KEY, Vec::new)
    }

    pub fn save_chat(&self, messages: &[ChatMessage]) -> Result<(), StoreError> {
        self.write_blob(CHAT_KEY, &messages)
    }

    /// The persisted session has no expiry: once written, the profile stays
    /// authenticated until an explicit logout removes it.
    pub fn load_session(&self) -> Option<UserProfile> {
        self.read_or_default(SESSION_KEY, || None)
    }

    pub fn save_session(&self, profile: &UserProfile) -> Result<(), StoreError> {
        self.write_blob(SESSION_KEY, profile)
    }

    pub fn clear_session(&self) -> Result<(), StoreError> {
        let path = self.root.join(SESSION_KEY);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}
