//! Local SQLite database for the admin client.
//!
//! Holds the `local_settings` category/key/value table (persisted session,
//! operator preferences) and the `lookup_cache` table used to keep
//! rarely-changing lookup lists between runs. Uses WAL mode and versioned
//! migrations.

use rusqlite::{params, Connection};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info, warn};

use crate::error::{AdminError, AdminResult};

/// Shared database handle.
pub struct DbState {
    pub conn: Mutex<Connection>,
    pub db_path: PathBuf,
}

impl DbState {
    /// In-memory database with all migrations applied.
    pub fn in_memory() -> AdminResult<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: PathBuf::from(":memory:"),
        })
    }

    pub fn lock(&self) -> AdminResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| AdminError::Storage(format!("db lock poisoned: {e}")))
    }
}

/// Current schema version. Bump when adding new migrations.
const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Initialize the database at `{data_dir}/admin.db`.
///
/// On open failure, deletes the file and retries once.
pub fn init(data_dir: &Path) -> AdminResult<DbState> {
    fs::create_dir_all(data_dir)
        .map_err(|e| AdminError::Storage(format!("Failed to create data dir: {e}")))?;

    let db_path = data_dir.join("admin.db");
    info!("Opening database at {}", db_path.display());

    let conn = match open_and_configure(&db_path) {
        Ok(c) => c,
        Err(first_err) => {
            warn!(
                "Database open failed ({}), deleting and retrying once",
                first_err
            );
            if db_path.exists() {
                let _ = fs::remove_file(&db_path);
                let _ = fs::remove_file(db_path.with_extension("db-wal"));
                let _ = fs::remove_file(db_path.with_extension("db-shm"));
            }
            open_and_configure(&db_path).map_err(|e| {
                AdminError::Storage(format!("Database open failed after retry: {e}"))
            })?
        }
    };

    run_migrations(&conn)?;

    info!("Database initialized (schema v{CURRENT_SCHEMA_VERSION})");

    Ok(DbState {
        conn: Mutex::new(conn),
        db_path,
    })
}

fn open_and_configure(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA busy_timeout = 5000;
         PRAGMA synchronous = NORMAL;",
    )?;
    Ok(conn)
}

fn run_migrations(conn: &Connection) -> AdminResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT DEFAULT (datetime('now'))
        );",
    )?;

    let current: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current >= CURRENT_SCHEMA_VERSION {
        info!("Database schema up to date (v{current})");
        return Ok(());
    }

    info!("Migrating database from v{current} to v{CURRENT_SCHEMA_VERSION}");

    if current < 1 {
        migrate_v1(conn)?;
    }
    if current < 2 {
        migrate_v2(conn)?;
    }
    Ok(())
}

/// Migration v1: settings store.
fn migrate_v1(conn: &Connection) -> AdminResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS local_settings (
            id TEXT PRIMARY KEY DEFAULT (lower(hex(randomblob(16)))),
            setting_category TEXT NOT NULL,
            setting_key TEXT NOT NULL,
            setting_value TEXT NOT NULL,
            created_at TEXT DEFAULT (datetime('now')),
            updated_at TEXT DEFAULT (datetime('now')),
            UNIQUE(setting_category, setting_key)
        );

        INSERT INTO schema_version (version) VALUES (1);
        ",
    )
    .map_err(|e| {
        error!("Migration v1 failed: {e}");
        AdminError::Storage(format!("migration v1: {e}"))
    })?;

    info!("Applied migration v1 (local_settings)");
    Ok(())
}

/// Migration v2: lookup list cache.
fn migrate_v2(conn: &Connection) -> AdminResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS lookup_cache (
            cache_key TEXT PRIMARY KEY,
            data TEXT NOT NULL,
            fetched_at INTEGER NOT NULL
        );

        INSERT INTO schema_version (version) VALUES (2);
        ",
    )
    .map_err(|e| {
        error!("Migration v2 failed: {e}");
        AdminError::Storage(format!("migration v2: {e}"))
    })?;

    info!("Applied migration v2 (lookup_cache)");
    Ok(())
}

// ---------------------------------------------------------------------------
// Settings helpers
// ---------------------------------------------------------------------------

/// Get a single setting value.
pub fn get_setting(conn: &Connection, category: &str, key: &str) -> Option<String> {
    conn.query_row(
        "SELECT setting_value FROM local_settings WHERE setting_category = ?1 AND setting_key = ?2",
        params![category, key],
        |row| row.get(0),
    )
    .ok()
}

/// Insert or update a setting.
pub fn set_setting(conn: &Connection, category: &str, key: &str, value: &str) -> AdminResult<()> {
    conn.execute(
        "INSERT INTO local_settings (setting_category, setting_key, setting_value, updated_at)
         VALUES (?1, ?2, ?3, datetime('now'))
         ON CONFLICT(setting_category, setting_key) DO UPDATE SET
            setting_value = excluded.setting_value,
            updated_at = excluded.updated_at",
        params![category, key, value],
    )?;
    Ok(())
}

pub fn delete_setting(conn: &Connection, category: &str, key: &str) -> AdminResult<()> {
    conn.execute(
        "DELETE FROM local_settings WHERE setting_category = ?1 AND setting_key = ?2",
        params![category, key],
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Lookup cache helpers
// ---------------------------------------------------------------------------

/// Read a cached lookup payload if it is younger than `max_age_ms`.
pub fn read_lookup_cache(
    conn: &Connection,
    cache_key: &str,
    now_ms: i64,
    max_age_ms: i64,
) -> Option<String> {
    conn.query_row(
        "SELECT data, fetched_at FROM lookup_cache WHERE cache_key = ?1",
        params![cache_key],
        |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
    )
    .ok()
    .filter(|(_, fetched_at)| now_ms.saturating_sub(*fetched_at) <= max_age_ms)
    .map(|(data, _)| data)
}

pub fn write_lookup_cache(
    conn: &Connection,
    cache_key: &str,
    data: &str,
    now_ms: i64,
) -> AdminResult<()> {
    conn.execute(
        "INSERT INTO lookup_cache (cache_key, data, fetched_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(cache_key) DO UPDATE SET data = excluded.data, fetched_at = excluded.fetched_at",
        params![cache_key, data, now_ms],
    )?;
    Ok(())
}

/// Drop every cached lookup list. Returns the number of rows removed.
pub fn clear_lookup_cache(conn: &Connection) -> AdminResult<usize> {
    Ok(conn.execute("DELETE FROM lookup_cache", [])?)
}

// ===========================================================================
// Tests
// ===========================================================================
