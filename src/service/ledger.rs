//! Processed-request log.
//!
//! A single JSON object on disk mapping `email::task::roundN` to the payload
//! sent to the evaluation service. Every save rewrites the whole file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::errors::LedgerError;

use super::models::NotificationPayload;

pub type ProcessedMap = BTreeMap<String, serde_json::Value>;

/// Key under which a completed round is recorded.
///
/// A missing email renders as an empty segment (`::task::round1`), never as a
/// placeholder such as `None`. Existing entries keyed with a placeholder still
/// load, but this function will not produce their keys.
pub fn processed_key(email: Option<&str>, task: &str, round: u32) -> String {
    format!("{}::{}::round{}", email.unwrap_or_default(), task, round)
}

/// Handle to the request log file. Clones share one writer lock.
#[derive(Clone)]
pub struct Ledger {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl Ledger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole log. A missing or unreadable file is an empty log.
    pub fn load(&self) -> ProcessedMap {
        load_from(&self.path)
    }

    /// Overwrite the log with `map`, pretty-printed.
    pub fn save(&self, map: &ProcessedMap) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(map)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| LedgerError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        // Write beside the target and rename so readers never see a half-written file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|source| LedgerError::Write {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| LedgerError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// Load, insert `payload` under `key`, and save, holding the writer lock
    /// so concurrent pipelines in this process never drop each other's keys.
    /// File IO runs on the blocking pool.
    pub async fn record(&self, key: &str, payload: &NotificationPayload) -> Result<(), LedgerError> {
        let value = serde_json::to_value(payload)?;
        let _guard = self.write_lock.lock().await;

        let ledger = self.clone();
        let owned_key = key.to_string();
        tokio::task::spawn_blocking(move || {
            let mut map = ledger.load();
            map.insert(owned_key, value);
            ledger.save(&map)
        })
        .await??;
        tracing::debug!(key = %key, path = %self.path.display(), "recorded processed request");
        Ok(())
    }
}

fn load_from(path: &Path) -> ProcessedMap {
    let Ok(raw) = std::fs::read_to_string(path) else {
        return ProcessedMap::new();
    };
    match serde_json::from_str(&raw) {
        Ok(map) => map,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "request log is corrupt, starting empty");
            ProcessedMap::new()
        }
    }
}
