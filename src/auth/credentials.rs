use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::warn;

/// Credential file name in the data directory
const CREDENTIAL_FILE: &str = "credential.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCredential {
    token: String,
}

/// Durable holder for the bearer credential.
///
/// The token is the only state the core persists; everything else is rebuilt
/// from it at process start. Writes go through an internal lock so
/// read-modify-write sequences never interleave; readers get the in-memory
/// copy via the watch channel.
pub struct CredentialStore {
    path: PathBuf,
    current: watch::Sender<Option<String>>,
    write_lock: Mutex<()>,
}

impl CredentialStore {
    /// Open the store, loading any credential persisted by a previous run.
    /// A file that fails to parse is treated as absent and removed.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let path = data_dir.into().join(CREDENTIAL_FILE);
        let initial = Self::load_from(&path);
        let (current, _) = watch::channel(initial);

        Ok(Self {
            path,
            current,
            write_lock: Mutex::new(()),
        })
    }

    fn load_from(path: &Path) -> Option<String> {
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(error = %e, "failed to read credential file");
                return None;
            }
        };
        match serde_json::from_str::<StoredCredential>(&contents) {
            Ok(stored) => Some(stored.token),
            Err(e) => {
                warn!(error = %e, "credential file is malformed; discarding it");
                let _ = std::fs::remove_file(path);
                None
            }
        }
    }

    /// Current token, if any.
    pub fn get(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    /// Store a new token, replacing any previous one.
    pub fn set(&self, token: &str) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap();
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create credential directory")?;
        }
        let contents = serde_json::to_string_pretty(&StoredCredential {
            token: token.to_string(),
        })?;
        std::fs::write(&self.path, contents).context("Failed to write credential file")?;
        self.current.send_replace(Some(token.to_string()));
        Ok(())
    }

    /// Remove the token from memory and disk.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap();
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("Failed to remove credential file")?;
        }
        self.current.send_replace(None);
        Ok(())
    }

    /// Watch for token changes. Receivers see the latest value on subscribe.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.current.subscribe()
    }
}
