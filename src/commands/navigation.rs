use tracing::debug;

use super::Outcome;
use crate::app::AdminApp;
use crate::routes::{guard, Access, Route};
use crate::store::Action;

/// Open a client path if the current session may see it.
///
/// Unknown paths are reported as a toast. The location only changes when
/// access is granted.
pub fn navigate(app: &AdminApp, path: &str) -> Outcome<Route> {
    let Some(route) = Route::parse(path) else {
        return Outcome::Toast(format!("Page not found: {path}"));
    };
    let access = app.read(|s| guard(&route, s.session.as_ref()));
    debug!(route = %route, ?access, "route guard");
    match access {
        Access::Allow => {
            app.dispatch(Action::Navigated(route.to_string()));
            Outcome::Success(route)
        }
        Access::RedirectLogin(to) => Outcome::Redirect(to),
        Access::Forbidden(req) => Outcome::Toast(format!(
            "You do not have permission to {} {}",
            req.action, req.page
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::app;
    use crate::auth::AuthSession;
    use crate::models::{Permission, User};

    fn signed_in(pages: &[&str]) -> AuthSession {
        AuthSession {
            user: User {
                id: "u1".into(),
                name: "Asha".into(),
                phone: None,
                email: None,
                role: None,
                permissions: pages
                    .iter()
                    .map(|p| Permission {
                        page: (*p).into(),
                        actions: vec!["view".into()],
                    })
                    .collect(),
            },
            expires_at: None,
        }
    }

    #[test]
    fn anonymous_navigation_redirects_without_moving() {
        let app = app("http://localhost:4000", None);
        assert_eq!(
            navigate(&app, "/reports/profit-loss"),
            Outcome::Redirect("/login?next=%2Freports%2Fprofit-loss".into())
        );
        assert!(app.read(|s| s.location.is_empty()));
    }

    #[test]
    fn permitted_navigation_updates_location() {
        let app = app("http://localhost:4000", None);
        app.dispatch(Action::SessionStarted(signed_in(&["orders"])));
        assert!(navigate(&app, "/orders/o7").is_success());
        assert_eq!(app.read(|s| s.location.clone()), "/orders/o7");

        assert!(matches!(navigate(&app, "/expenses"), Outcome::Toast(_)));
        assert_eq!(app.read(|s| s.location.clone()), "/orders/o7");
    }

    #[test]
    fn unknown_path_is_reported() {
        let app = app("http://localhost:4000", None);
        assert!(matches!(navigate(&app, "/nowhere"), Outcome::Toast(m) if m.contains("/nowhere")));
    }
}
