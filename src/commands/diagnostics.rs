use serde_json::Value;

use super::{respond, Outcome};
use crate::app::AdminApp;
use crate::diagnostics;

/// Everything the POS troubleshooting page shows.
pub async fn troubleshooting_report(app: &AdminApp) -> Value {
    let mut report = diagnostics::get_about_info();
    report["health"] = diagnostics::get_system_health(&app.config, &app.db, &app.api).await;
    report
}

pub fn reset_cache(app: &AdminApp) -> Outcome<usize> {
    respond(app, diagnostics::reset_lookup_cache(&app.db))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::app;

    #[tokio::test]
    async fn report_combines_about_and_health() {
        let app = app("http://127.0.0.1:9", None);
        let report = troubleshooting_report(&app).await;
        assert!(report.get("version").is_some());
        assert_eq!(report["health"]["api"]["reachable"], Value::Bool(false));
        assert_eq!(reset_cache(&app), Outcome::Success(0));
    }
}
