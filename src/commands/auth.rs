use tracing::info;

use super::{fail, finish, Outcome};
use crate::app::AdminApp;
use crate::auth::{self, AuthSession};
use crate::models::User;
use crate::routes::{Route, LOGIN_PATH};
use crate::store::Action;

/// Where to go after a successful login: the `next` path if it is a known
/// client route, otherwise the dashboard.
pub fn post_login_target(next: Option<&str>) -> String {
    next.and_then(Route::parse)
        .filter(|route| *route != Route::Login)
        .map(|route| route.to_string())
        .unwrap_or_else(|| Route::Dashboard.to_string())
}

/// Log in and redirect to `next`.
pub async fn login(app: &AdminApp, username: &str, password: &str, next: Option<&str>) -> Outcome<User> {
    let result = auth::login(&app.api, username, password).await;
    match finish(app, result, |session| Action::SessionStarted(session.clone())) {
        Outcome::Success(session) => {
            let target = post_login_target(next);
            app.dispatch(Action::Navigated(target));
            Outcome::Success(session.user)
        }
        other => other.map(|s: AuthSession| s.user),
    }
}

/// Restore a persisted session at startup. `Success(None)` when there is none.
pub async fn restore_session(app: &AdminApp) -> Outcome<Option<User>> {
    match auth::verify_token(&app.api).await {
        Ok(Some(session)) => {
            info!(user_id = %session.user.id, "session restored");
            let user = session.user.clone();
            app.dispatch(Action::SessionStarted(session));
            Outcome::Success(Some(user))
        }
        Ok(None) => Outcome::Success(None),
        Err(e) => fail(app, e),
    }
}

pub fn logout(app: &AdminApp) -> Outcome<()> {
    match auth::logout(&app.api) {
        Ok(()) => {
            app.dispatch(Action::SessionEnded);
            app.dispatch(Action::Navigated(LOGIN_PATH.to_string()));
            Outcome::Success(())
        }
        Err(e) => fail(app, e),
    }
}
