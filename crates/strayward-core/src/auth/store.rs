//! Durable storage for the access/refresh token pair.
//!
//! Stores know nothing about expiry: an expired access token is only
//! discovered when an authorized request comes back 401.

use std::collections::{hash_map, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{Config, TokenStoreKind, APP_NAME};
use crate::models::TokenPair;

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Which half of the token pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    /// Fixed storage key for this token.
    pub fn key(&self) -> &'static str {
        match self {
            TokenKind::Access => "access_token",
            TokenKind::Refresh => "refresh_token",
        }
    }
}

/// Snapshot of what a store currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Session {
    /// A session is usable once an access token is present.
    pub fn is_established(&self) -> bool {
        self.access_token.is_some()
    }

    fn slot(&mut self, kind: TokenKind) -> &mut Option<String> {
        match kind {
            TokenKind::Access => &mut self.access_token,
            TokenKind::Refresh => &mut self.refresh_token,
        }
    }

    fn get(&self, kind: TokenKind) -> Option<String> {
        match kind {
            TokenKind::Access => self.access_token.clone(),
            TokenKind::Refresh => self.refresh_token.clone(),
        }
    }

    fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Key-value storage for the two session tokens.
///
/// Shared between the HTTP client (reads on every request, writes on
/// refresh) and the session context (writes on login and logout).
/// Writes are last-write-wins.
pub trait TokenStore: Send + Sync {
    fn get(&self, kind: TokenKind) -> Option<String>;

    fn set(&self, kind: TokenKind, token: &str) -> Result<()>;

    fn clear(&self, kind: TokenKind) -> Result<()>;

    /// Persist a freshly issued pair.
    fn store_pair(&self, pair: &TokenPair) -> Result<()> {
        self.set(TokenKind::Access, &pair.access_token)?;
        self.set(TokenKind::Refresh, &pair.refresh_token)
    }

    /// Remove both tokens.
    fn clear_all(&self) -> Result<()> {
        self.clear(TokenKind::Access)?;
        self.clear(TokenKind::Refresh)
    }

    fn session(&self) -> Session {
        Session {
            access_token: self.get(TokenKind::Access),
            refresh_token: self.get(TokenKind::Refresh),
        }
    }
}

/// Open the backend selected in the configuration.
pub fn open_token_store(config: &Config) -> Result<Arc<dyn TokenStore>> {
    let store: Arc<dyn TokenStore> = match config.token_store {
        TokenStoreKind::File => Arc::new(FileTokenStore::new(config.cache_dir()?)),
        TokenStoreKind::Keyring => Arc::new(KeyringTokenStore::new()),
        TokenStoreKind::Memory => Arc::new(MemoryTokenStore::new()),
    };
    debug!(backend = ?config.token_store, "Token store opened");
    Ok(store)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic while holding the lock cannot leave a half-written token
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Write a file readable only by its owner.
#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; tighten files left by older runs
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(contents)
}

// ============================================================================
// In-memory
// ============================================================================

/// Tokens held in process memory only.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<HashMap<TokenKind, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a session, mostly useful in tests.
    pub fn with_tokens(access: Option<&str>, refresh: Option<&str>) -> Self {
        let mut tokens = HashMap::new();
        if let Some(access) = access {
            tokens.insert(TokenKind::Access, access.to_string());
        }
        if let Some(refresh) = refresh {
            tokens.insert(TokenKind::Refresh, refresh.to_string());
        }
        Self {
            tokens: Mutex::new(tokens),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, kind: TokenKind) -> Option<String> {
        lock(&self.tokens).get(&kind).cloned()
    }

    fn set(&self, kind: TokenKind, token: &str) -> Result<()> {
        lock(&self.tokens).insert(kind, token.to_string());
        Ok(())
    }

    fn clear(&self, kind: TokenKind) -> Result<()> {
        lock(&self.tokens).remove(&kind);
        Ok(())
    }
}

// ============================================================================
// File
// ============================================================================

/// Tokens persisted as `session.json` in the cache directory.
///
/// The file is re-read on every `get` so separate invocations of the
/// client observe each other's refreshes.
pub struct FileTokenStore {
    cache_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            write_lock: Mutex::new(()),
        }
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }

    fn load(&self) -> Session {
        let path = self.session_path();
        if !path.exists() {
            return Session::default();
        }
        let parsed = std::fs::read_to_string(&path)
            .context("Failed to read session file")
            .and_then(|contents| {
                serde_json::from_str::<Session>(&contents).context("Failed to parse session file")
            });
        match parsed {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Ignoring unreadable session file");
                Session::default()
            }
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        let path = self.session_path();
        if session.is_empty() {
            if path.exists() {
                std::fs::remove_file(&path).context("Failed to remove session file")?;
            }
            return Ok(());
        }
        std::fs::create_dir_all(&self.cache_dir).context("Failed to create cache directory")?;
        let contents = serde_json::to_string_pretty(session)?;
        write_private(&path, contents.as_bytes()).context("Failed to write session file")?;
        Ok(())
    }

    fn modify(&self, kind: TokenKind, value: Option<&str>) -> Result<()> {
        let _guard = lock(&self.write_lock);
        let mut session = self.load();
        *session.slot(kind) = value.map(str::to_string);
        self.save(&session)
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, kind: TokenKind) -> Option<String> {
        self.load().get(kind)
    }

    fn set(&self, kind: TokenKind, token: &str) -> Result<()> {
        self.modify(kind, Some(token))
    }

    fn clear(&self, kind: TokenKind) -> Result<()> {
        self.modify(kind, None)
    }
}

// ============================================================================
// OS keychain
// ============================================================================

/// Tokens stored in the OS keychain, one entry per token key.
///
/// Entries are opened once and kept for the life of the store.
pub struct KeyringTokenStore {
    service: String,
    entries: Mutex<HashMap<TokenKind, Entry>>,
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self::with_service(APP_NAME)
    }

    pub fn with_service(service: &str) -> Self {
        Self {
            service: service.to_string(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn with_entry<T>(&self, kind: TokenKind, f: impl FnOnce(&Entry) -> T) -> Result<T> {
        let mut entries = lock(&self.entries);
        let entry = match entries.entry(kind) {
            hash_map::Entry::Occupied(slot) => slot.into_mut(),
            hash_map::Entry::Vacant(slot) => {
                let entry = Entry::new(&self.service, kind.key())
                    .context("Failed to create keyring entry")?;
                slot.insert(entry)
            }
        };
        Ok(f(entry))
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self, kind: TokenKind) -> Option<String> {
        let read = match self.with_entry(kind, |entry| entry.get_password()) {
            Ok(read) => read,
            Err(e) => {
                warn!(error = %e, key = kind.key(), "Keyring unavailable");
                return None;
            }
        };
        match read {
            Ok(token) => Some(token),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(error = %e, key = kind.key(), "Failed to read token from keychain");
                None
            }
        }
    }

    fn set(&self, kind: TokenKind, token: &str) -> Result<()> {
        self.with_entry(kind, |entry| entry.set_password(token))?
            .context("Failed to store token in keychain")
    }

    fn clear(&self, kind: TokenKind) -> Result<()> {
        match self.with_entry(kind, |entry| entry.delete_credential())? {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}
