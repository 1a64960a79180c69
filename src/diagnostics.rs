//! Diagnostics behind the POS troubleshooting page.
//!
//! Provides:
//! - **About info**: version, build timestamp, git SHA, platform
//! - **System health**: API reachability, local database state, cached
//!   lookups, session presence and log files
//! - **Cache reset**: drops cached lookup lists so they are refetched

use std::fs;

use chrono::Utc;
use rusqlite::Connection;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::db::{self, DbState};
use crate::error::AdminResult;
use crate::logging;

// ---------------------------------------------------------------------------
// About info
// ---------------------------------------------------------------------------

/// Returns version, build timestamp, git SHA, and platform info.
pub fn get_about_info() -> Value {
    json!({
        "version": env!("CARGO_PKG_VERSION"),
        "buildTimestamp": env!("BUILD_TIMESTAMP"),
        "gitSha": env!("BUILD_GIT_SHA"),
        "platform": std::env::consts::OS,
        "arch": std::env::consts::ARCH,
        "rustVersion": env!("CARGO_PKG_RUST_VERSION"),
    })
}

// ---------------------------------------------------------------------------
// System health
// ---------------------------------------------------------------------------

/// Collects health status for the troubleshooting page.
pub async fn get_system_health(config: &AppConfig, db: &DbState, api: &ApiClient) -> Value {
    // Local checks first so the lock is not held across the network probe.
    let (schema_version, cached_lookups, db_size) = match db.lock() {
        Ok(conn) => {
            let schema_version: i32 = conn
                .query_row(
                    "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                    [],
                    |row| row.get(0),
                )
                .unwrap_or(0);
            let cached = cached_lookups(&conn);
            let db_size = fs::metadata(&db.db_path).map(|m| m.len()).unwrap_or(0);
            (schema_version, cached, db_size)
        }
        Err(e) => {
            warn!("health check could not lock db: {e}");
            (0, json!([]), 0)
        }
    };

    let session_present = match api.sessions().load() {
        Ok(auth) => auth.is_some(),
        Err(e) => {
            warn!("health check could not read session: {e}");
            false
        }
    };

    let api_status = match api.ping().await {
        Ok(latency_ms) => json!({ "reachable": true, "latencyMs": latency_ms }),
        Err(e) => json!({ "reachable": false, "error": e.to_string() }),
    };

    let log_dir = config.log_dir();
    json!({
        "apiBaseUrl": api.base_url(),
        "api": api_status,
        "schemaVersion": schema_version,
        "dbSizeBytes": db_size,
        "cachedLookups": cached_lookups,
        "sessionPresent": session_present,
        "sessionBackend": config.session_backend,
        "logDir": log_dir.display().to_string(),
        "logFiles": logging::list_log_files(&log_dir).len(),
    })
}

fn cached_lookups(conn: &Connection) -> Value {
    let now_ms = Utc::now().timestamp_millis();
    let mut out = Vec::new();
    if let Ok(mut stmt) =
        conn.prepare("SELECT cache_key, fetched_at FROM lookup_cache ORDER BY cache_key")
    {
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .ok();
        if let Some(rows) = rows {
            for (key, fetched_at) in rows.flatten() {
                out.push(json!({
                    "key": key,
                    "ageSecs": now_ms.saturating_sub(fetched_at) / 1000,
                }));
            }
        }
    }
    Value::Array(out)
}

// ---------------------------------------------------------------------------
// Cache reset
// ---------------------------------------------------------------------------

pub fn reset_lookup_cache(db: &DbState) -> AdminResult<usize> {
    let conn = db.lock()?;
    let removed = db::clear_lookup_cache(&conn)?;
    info!(removed, "lookup cache cleared");
    Ok(removed)
}
