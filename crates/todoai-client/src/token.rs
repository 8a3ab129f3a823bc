//! Bearer token storage.
//!
//! A [`TokenHolder`] keeps the token in two places: an in-process slot that
//! every request reads, and a durable [`TokenStore`] that survives restarts.
//! The holder is handed to the API client at construction; only the auth
//! session writes to it.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::error::ApiError;
use crate::error::Result;

/// Matches the max-age of the browser cookie the token used to live in.
pub const TOKEN_LIFETIME_DAYS: i64 = 7;

/// A token together with the moment it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    /// `None` for stores that never expire tokens.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredToken {
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> Result<Option<StoredToken>>;
    async fn save(&self, token: &str) -> Result<StoredToken>;
    async fn remove(&self) -> Result<()>;
}

#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<StoredToken>>,
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<StoredToken>> {
        Ok(self.token.read().await.clone())
    }

    async fn save(&self, token: &str) -> Result<StoredToken> {
        let stored = StoredToken {
            access_token: token.to_string(),
            expires_at: None,
        };
        *self.token.write().await = Some(stored.clone());
        Ok(stored)
    }

    async fn remove(&self) -> Result<()> {
        *self.token.write().await = None;
        Ok(())
    }
}

/// Persists the token as JSON with an expiry timestamp.
pub struct FileTokenStore {
    path: PathBuf,
    lifetime: Duration,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lifetime: Duration::days(TOKEN_LIFETIME_DAYS),
        }
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<StoredToken>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path).await?;
        let stored = match serde_json::from_str::<StoredToken>(&raw) {
            Ok(stored) => stored,
            Err(err) => {
                log::warn!("Ignoring unreadable token file {:?}: {}", self.path, err);
                return Ok(None);
            }
        };

        if stored.expires_at.is_none() || stored.is_expired() {
            log::info!("Stored token expired at {:?}", stored.expires_at);
            self.remove().await?;
            return Ok(None);
        }

        Ok(Some(stored))
    }

    async fn save(&self, token: &str) -> Result<StoredToken> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let stored = StoredToken {
            access_token: token.to_string(),
            expires_at: Some(Utc::now() + self.lifetime),
        };

        // The staging file is created owner-only, so the token is never
        // readable by others, not even while it is being written.
        let staging = self.staging_path();
        match fs::remove_file(&staging).await {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => return Err(err.into()),
            _ => {}
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&staging).await?;
        file.write_all(&serde_json::to_vec(&stored)?).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&staging, &self.path).await?;
        Ok(stored)
    }

    async fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ApiError::storage(err.to_string())),
        }
    }
}

/// Shared handle to the current bearer token.
#[derive(Clone)]
pub struct TokenHolder {
    cached: Arc<RwLock<Option<StoredToken>>>,
    durable: Arc<dyn TokenStore>,
}

impl TokenHolder {
    pub fn new(durable: Arc<dyn TokenStore>) -> Self {
        Self {
            cached: Arc::new(RwLock::new(None)),
            durable,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::default()))
    }

    pub async fn get(&self) -> Option<String> {
        {
            let mut cached = self.cached.write().await;
            match cached.as_ref() {
                Some(stored) if !stored.is_expired() => return Some(stored.access_token.clone()),
                Some(_) => *cached = None,
                None => {}
            }
        }

        // The durable store drops expired tokens on load.
        match self.durable.load().await {
            Ok(Some(stored)) if !stored.is_expired() => {
                let token = stored.access_token.clone();
                *self.cached.write().await = Some(stored);
                Some(token)
            }
            Ok(_) => None,
            Err(err) => {
                log::warn!("Failed to load stored token: {}", err);
                None
            }
        }
    }

    pub async fn set(&self, token: &str) -> Result<()> {
        let stored = self.durable.save(token).await?;
        *self.cached.write().await = Some(stored);
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        *self.cached.write().await = None;
        self.durable.remove().await
    }

    pub async fn is_present(&self) -> bool {
        self.get().await.is_some()
    }
}

/// Short, log-safe prefix of a token.
pub fn token_preview(token: &str) -> String {
    let prefix: String = token.chars().take(8).collect();
    format!("{prefix}...")
}
