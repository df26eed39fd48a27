use std::collections::HashMap;
use std::fmt::Display;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{WizardError, WizardResult};

/// Keys the wizard persists for the confirmation page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    SelectedLocation,
    UserId,
}

impl Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionKey::SelectedLocation => write!(f, "selectedLocation"),
            SessionKey::UserId => write!(f, "userId"),
        }
    }
}

/// A persisted value with its write time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub value: String,
    pub written_at: DateTime<Utc>,
}

/// Session-scoped key/value storage that survives the hand-off to the confirmation page
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn set(&self, key: SessionKey, value: &str) -> WizardResult<()>;

    async fn get(&self, key: SessionKey) -> WizardResult<Option<SessionEntry>>;
}

/// In-process session storage
#[derive(Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, SessionEntry>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn set(&self, key: SessionKey, value: &str) -> WizardResult<()> {
        let entry = SessionEntry {
            value: value.to_string(),
            written_at: Utc::now(),
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: SessionKey) -> WizardResult<Option<SessionEntry>> {
        Ok(self.entries.read().await.get(&key.to_string()).cloned())
    }
}

/// Session storage backed by a JSON object on disk
///
/// The whole map is rewritten on every `set`; the wizard writes at most two keys per
/// classification.
pub struct JsonFileSessionStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, SessionEntry>>,
}

impl JsonFileSessionStore {
    /// Opens the store, loading any entries a previous run left behind
    pub async fn open(path: impl Into<PathBuf>) -> WizardResult<Self> {
        let path = path.into();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) if raw.trim().is_empty() => HashMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                WizardError::Session(format!("corrupt session file {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), entries = entries.len(), "Session store opened");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }
}

#[async_trait::async_trait]
impl SessionStore for JsonFileSessionStore {
    async fn set(&self, key: SessionKey, value: &str) -> WizardResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            SessionEntry {
                value: value.to_string(),
                written_at: Utc::now(),
            },
        );

        let raw = serde_json::to_string_pretty(&*entries)
            .map_err(|e| WizardError::Session(e.to_string()))?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }

    async fn get(&self, key: SessionKey) -> WizardResult<Option<SessionEntry>> {
        Ok(self.entries.read().await.get(&key.to_string()).cloned())
    }
}
