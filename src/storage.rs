//! Persisted auth state.
//!
//! The session (bearer token + last known user) is stored as JSON under the
//! key `auth`, either in the local SQLite `local_settings` table or in the OS
//! credential store (DPAPI / Keychain / Secret Service via `keyring`).

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use zeroize::Zeroize;

use crate::config::SessionBackend;
use crate::db::{self, DbState};
use crate::error::AdminResult;
use crate::models::User;

/// Storage key of the persisted session.
pub const AUTH_KEY: &str = "auth";

const SERVICE_NAME: &str = "resto-admin";
const SETTINGS_CATEGORY: &str = "persist";

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedAuth {
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
    pub saved_at: DateTime<Utc>,
}

impl PersistedAuth {
    pub fn new(token: impl Into<String>, user: Option<User>) -> Self {
        Self {
            token: token.into(),
            user,
            saved_at: Utc::now(),
        }
    }
}

impl fmt::Debug for PersistedAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedAuth")
            .field("token", &"***")
            .field("user", &self.user.as_ref().map(|u| &u.id))
            .field("saved_at", &self.saved_at)
            .finish()
    }
}

impl Drop for PersistedAuth {
    fn drop(&mut self) {
        self.token.zeroize();
    }
}

pub trait SessionStore: Send + Sync {
    fn load(&self) -> AdminResult<Option<PersistedAuth>>;
    fn save(&self, auth: &PersistedAuth) -> AdminResult<()>;
    /// Remove the persisted entry. Succeeds when nothing is stored.
    fn clear(&self) -> AdminResult<()>;
}

fn decode(raw: &str) -> Option<PersistedAuth> {
    match serde_json::from_str::<PersistedAuth>(raw) {
        Ok(auth) if !auth.token.trim().is_empty() => Some(auth),
        Ok(_) => None,
        Err(e) => {
            warn!(error = %e, "persisted auth entry is unreadable, ignoring it");
            None
        }
    }
}

fn encode(auth: &PersistedAuth) -> AdminResult<String> {
    serde_json::to_string(auth)
        .map_err(|e| crate::error::AdminError::Storage(format!("encode auth: {e}")))
}

// ---------------------------------------------------------------------------
// SQLite backend
// ---------------------------------------------------------------------------

pub struct SqliteSessionStore {
    db: Arc<DbState>,
}

impl SqliteSessionStore {
    pub fn new(db: Arc<DbState>) -> Self {
        Self { db }
    }
}

impl SessionStore for SqliteSessionStore {
    fn load(&self) -> AdminResult<Option<PersistedAuth>> {
        let conn = self.db.lock()?;
        Ok(db::get_setting(&conn, SETTINGS_CATEGORY, AUTH_KEY).and_then(|raw| decode(&raw)))
    }

    fn save(&self, auth: &PersistedAuth) -> AdminResult<()> {
        let raw = encode(auth)?;
        let conn = self.db.lock()?;
        db::set_setting(&conn, SETTINGS_CATEGORY, AUTH_KEY, &raw)
    }

    fn clear(&self) -> AdminResult<()> {
        let conn = self.db.lock()?;
        db::delete_setting(&conn, SETTINGS_CATEGORY, AUTH_KEY)?;
        info!("persisted auth cleared");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// OS credential store backend
// ---------------------------------------------------------------------------

pub struct KeyringSessionStore {
    entry: Entry,
}

impl KeyringSessionStore {
    pub fn new() -> AdminResult<Self> {
        Ok(Self {
            entry: Entry::new(SERVICE_NAME, AUTH_KEY)?,
        })
    }
}

impl SessionStore for KeyringSessionStore {
    fn load(&self) -> AdminResult<Option<PersistedAuth>> {
        match self.entry.get_password() {
            Ok(raw) => Ok(decode(&raw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, auth: &PersistedAuth) -> AdminResult<()> {
        let raw = encode(auth)?;
        self.entry.set_password(&raw)?;
        Ok(())
    }

    fn clear(&self) -> AdminResult<()> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {
                info!("persisted auth cleared");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Open the configured backend.
pub fn open_session_store(
    backend: SessionBackend,
    db: Arc<DbState>,
) -> AdminResult<Arc<dyn SessionStore>> {
    match backend {
        SessionBackend::Sqlite => Ok(Arc::new(SqliteSessionStore::new(db))),
        SessionBackend::Keyring => Ok(Arc::new(KeyringSessionStore::new()?)),
    }
}
