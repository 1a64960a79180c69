//! Page actions.
//!
//! Each action performs one service call and, only when it succeeds,
//! dispatches the result to the store. Errors are turned into what the
//! page shows: a toast, inline field errors, or a redirect.

pub mod auth;
pub mod coupons;
pub mod diagnostics;
pub mod expenses;
pub mod lookup;
pub mod loyalty;
pub mod menu;
pub mod navigation;
pub mod orders;
pub mod reports;
pub mod restaurant;
pub mod users;

use tracing::{info, warn};

use crate::app::AdminApp;
use crate::error::{AdminError, AdminResult, FieldErrors};
use crate::routes::login_redirect;
use crate::store::Action;

/// What a page does with the result of an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    /// Network, HTTP or server-reported failure shown as a toast/banner.
    Toast(String),
    FieldErrors(FieldErrors),
    Redirect(String),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(v) => Outcome::Success(f(v)),
            Outcome::Toast(m) => Outcome::Toast(m),
            Outcome::FieldErrors(e) => Outcome::FieldErrors(e),
            Outcome::Redirect(to) => Outcome::Redirect(to),
        }
    }
}

/// Surface an error. A 401 also ends the in-memory session.
pub(crate) fn fail<T>(app: &AdminApp, err: AdminError) -> Outcome<T> {
    match err {
        AdminError::Validation(fields) => Outcome::FieldErrors(fields),
        AdminError::Unauthorized => {
            let next = app.read(|s| s.location.clone());
            info!(next = %next, "session rejected, redirecting to login");
            app.dispatch(Action::SessionEnded);
            Outcome::Redirect(login_redirect(&next))
        }
        err @ AdminError::InvalidTransition { .. } => {
            warn!("{err}");
            Outcome::Toast(err.to_string())
        }
        other => {
            warn!(category = ?other.category(), "{other}");
            Outcome::Toast(other.to_string())
        }
    }
}

/// Dispatch `to_action(&value)` on success, otherwise surface the error.
pub(crate) fn finish<T>(
    app: &AdminApp,
    result: AdminResult<T>,
    to_action: impl FnOnce(&T) -> Action,
) -> Outcome<T> {
    match result {
        Ok(value) => {
            app.dispatch(to_action(&value));
            Outcome::Success(value)
        }
        Err(e) => fail(app, e),
    }
}

/// Like [`finish`] for results that do not touch the store.
pub(crate) fn respond<T>(app: &AdminApp, result: AdminResult<T>) -> Outcome<T> {
    match result {
        Ok(value) => Outcome::Success(value),
        Err(e) => fail(app, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::app;
    use crate::order_status::OrderStatus;

    #[test]
    fn unauthorized_clears_session_and_redirects_with_next() {
        let app = app("http://localhost:4000", None);
        app.dispatch(Action::Navigated("/orders/o1".into()));
        let outcome: Outcome<()> = fail(&app, AdminError::Unauthorized);
        assert_eq!(
            outcome,
            Outcome::Redirect("/login?next=%2Forders%2Fo1".into())
        );
        assert!(app.read(|s| s.session.is_none()));
    }

    #[test]
    fn validation_becomes_field_errors() {
        let app = app("http://localhost:4000", None);
        let outcome: Outcome<()> = fail(&app, AdminError::field("name", "Name is required"));
        let Outcome::FieldErrors(fields) = outcome else {
            panic!("expected field errors");
        };
        assert_eq!(fields["name"], "Name is required");
    }

    #[test]
    fn invalid_transition_is_a_toast() {
        let app = app("http://localhost:4000", None);
        let outcome: Outcome<()> = fail(
            &app,
            AdminError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Delivered,
            },
        );
        assert!(matches!(outcome, Outcome::Toast(m) if m.contains("pending")));
    }
}
