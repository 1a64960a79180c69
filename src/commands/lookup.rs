use super::{respond, Outcome};
use crate::app::AdminApp;
use crate::lookup::{self, LookupKind};
use crate::models::LookupEntry;

/// Options for a select box (expense types, payment modes, order statuses).
pub async fn options(app: &AdminApp, kind: LookupKind) -> Outcome<Vec<LookupEntry>> {
    let result = lookup::fetch(&app.api, &app.db, kind).await;
    respond(app, result)
}
