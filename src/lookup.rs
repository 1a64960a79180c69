//! Lookup lists (`/lookup/*`) with a local cache.
//!
//! Expense types, payment modes and order statuses change rarely, so a
//! fetched list is kept in the `lookup_cache` table for a day.

use chrono::Utc;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::db::{self, DbState};
use crate::error::{AdminError, AdminResult};
use crate::models::LookupEntry;

pub(crate) const LOOKUP_CACHE_TTL_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    ExpenseTypes,
    PaymentModes,
    OrderStatuses,
}

impl LookupKind {
    pub fn slug(self) -> &'static str {
        match self {
            LookupKind::ExpenseTypes => "expense-types",
            LookupKind::PaymentModes => "payment-modes",
            LookupKind::OrderStatuses => "order-statuses",
        }
    }
}

/// Fetch a lookup list, serving from the local cache while it is fresh.
pub async fn fetch(api: &ApiClient, db: &DbState, kind: LookupKind) -> AdminResult<Vec<LookupEntry>> {
    let now_ms = Utc::now().timestamp_millis();
    let cached = db
        .lock()
        .ok()
        .and_then(|conn| db::read_lookup_cache(&conn, kind.slug(), now_ms, LOOKUP_CACHE_TTL_MS));
    if let Some(raw) = cached {
        match serde_json::from_str::<Vec<LookupEntry>>(&raw) {
            Ok(entries) => {
                debug!(kind = kind.slug(), "lookup served from cache");
                return Ok(entries);
            }
            Err(e) => warn!(kind = kind.slug(), error = %e, "lookup cache unreadable"),
        }
    }

    let entries: Vec<LookupEntry> = api
        .get(&format!("/lookup/{}", kind.slug()), &[])
        .await?;
    if let Err(e) = store_in_cache(db, kind, &entries, now_ms) {
        warn!(kind = kind.slug(), error = %e, "lookup not cached");
    }
    Ok(entries)
}

fn store_in_cache(
    db: &DbState,
    kind: LookupKind,
    entries: &[LookupEntry],
    now_ms: i64,
) -> AdminResult<()> {
    let raw = serde_json::to_string(entries).map_err(|e| AdminError::Storage(e.to_string()))?;
    let conn = db.lock()?;
    db::write_lookup_cache(&conn, kind.slug(), &raw, now_ms)
}
