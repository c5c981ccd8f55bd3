//! Persistent storage for the bearer token pair
//!
//! Stores never inspect token contents. The access and refresh tokens live
//! and die together.

use shopfront_core::{Credentials, ErrorContext};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;

/// File name used by [`FileTokenStore`] inside its directory
pub const CREDENTIALS_FILE: &str = "credentials.json";

/// Which token to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An access token update was attempted without a stored pair
    #[error("No stored session")]
    NoSession,

    #[error("Token store lock poisoned")]
    Poisoned,
}

/// Key-value storage for the credentials pair
pub trait TokenStore: Send + Sync {
    /// Read one token
    fn get(&self, kind: TokenKind) -> Option<String>;

    /// Persist a complete pair, replacing any previous one
    fn set(&self, pair: &Credentials) -> Result<(), StoreError>;

    /// Replace the access token of the stored pair
    fn set_access_token(&self, token: &str) -> Result<(), StoreError>;

    /// Remove every persisted authentication artifact
    fn clear(&self) -> Result<(), StoreError>;

    fn credentials(&self) -> Option<Credentials> {
        Some(Credentials::new(
            self.get(TokenKind::Access)?,
            self.get(TokenKind::Refresh)?,
        ))
    }
}

fn token_of(pair: &Credentials, kind: TokenKind) -> String {
    match kind {
        TokenKind::Access => pair.access_token.clone(),
        TokenKind::Refresh => pair.refresh_token.clone(),
    }
}

/// Process-local store; nothing survives a restart
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    pair: RwLock<Option<Credentials>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(pair: Credentials) -> Self {
        Self {
            pair: RwLock::new(Some(pair)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, kind: TokenKind) -> Option<String> {
        let guard = self.pair.read().ok()?;
        guard.as_ref().map(|pair| token_of(pair, kind))
    }

    fn set(&self, pair: &Credentials) -> Result<(), StoreError> {
        *self.pair.write().map_err(|_| StoreError::Poisoned)? = Some(pair.clone());
        Ok(())
    }

    fn set_access_token(&self, token: &str) -> Result<(), StoreError> {
        let mut guard = self.pair.write().map_err(|_| StoreError::Poisoned)?;
        let pair = guard.as_mut().ok_or(StoreError::NoSession)?;
        pair.access_token = token.to_string();
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.pair.write().map_err(|_| StoreError::Poisoned)? = None;
        Ok(())
    }
}

/// Store backed by a JSON file, cached in memory
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash never leaves a half-written pair behind.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    cache: RwLock<Option<Credentials>>,
}

impl FileTokenStore {
    /// Open (or lazily create) the store in `dir`
    ///
    /// A corrupt credentials file is discarded rather than trusted.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))
            .map_err(StoreError::Io)?;

        let path = dir.join(CREDENTIALS_FILE);
        let cached = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Credentials>(&content) {
                Ok(pair) => Some(pair),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "Discarding unreadable credentials file");
                    fs::remove_file(&path)
                        .with_context(|| format!("removing {}", path.display()))
                        .map_err(StoreError::Io)?;
                    None
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                return Err(StoreError::Io(format!("reading {}: {err}", path.display())));
            }
        };

        Ok(Self {
            path,
            cache: RwLock::new(cached),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, pair: &Credentials) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(pair)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        write_private(&tmp, content.as_bytes())
            .with_context(|| format!("writing {}", tmp.display()))
            .map_err(StoreError::Io)?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))
            .map_err(StoreError::Io)
    }
}

#[cfg(unix)]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(content)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    fs::write(path, content)
}

impl TokenStore for FileTokenStore {
    fn get(&self, kind: TokenKind) -> Option<String> {
        let guard = self.cache.read().ok()?;
        guard.as_ref().map(|pair| token_of(pair, kind))
    }

    fn set(&self, pair: &Credentials) -> Result<(), StoreError> {
        let mut guard = self.cache.write().map_err(|_| StoreError::Poisoned)?;
        self.persist(pair)?;
        *guard = Some(pair.clone());
        Ok(())
    }

    fn set_access_token(&self, token: &str) -> Result<(), StoreError> {
        let mut guard = self.cache.write().map_err(|_| StoreError::Poisoned)?;
        let mut pair = guard.clone().ok_or(StoreError::NoSession)?;
        pair.access_token = token.to_string();
        self.persist(&pair)?;
        *guard = Some(pair);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut guard = self.cache.write().map_err(|_| StoreError::Poisoned)?;
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(StoreError::Io(format!(
                    "removing {}: {err}",
                    self.path.display()
                )));
            }
        }
        // Cache follows the disk so a failed removal leaves both intact
        *guard = None;
        Ok(())
    }
}
