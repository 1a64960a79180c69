//! Login, token verification and logout against the back-office API.
//!
//! The bearer token is persisted under the `auth` key through the configured
//! [`SessionStore`]; only the user profile and expiry are mirrored into the
//! client-side state. JWT expiry is read from the token payload (without
//! verifying the signature) so an obviously expired token is dropped before
//! it is sent.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::api::ApiClient;
use crate::error::{AdminError, AdminResult, FieldErrors};
use crate::models::User;
use crate::storage::PersistedAuth;

/// Authenticated session as mirrored in the client-side state.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub user: User,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }

    pub fn can(&self, page: &str, action: &str) -> bool {
        self.user.can(page, action)
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    user: User,
}

/// Read the `exp` claim of a JWT. Returns `None` for opaque tokens.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let decoded = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: Value = serde_json::from_slice(&decoded).ok()?;
    let exp = claims.get("exp")?.as_i64()?;
    Utc.timestamp_opt(exp, 0).single()
}

fn validate_credentials(username: &str, password: &str) -> AdminResult<()> {
    let mut errors = FieldErrors::new();
    if username.trim().is_empty() {
        errors.insert("username".into(), "Username is required".into());
    }
    if password.is_empty() {
        errors.insert("password".into(), "Password is required".into());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AdminError::Validation(errors))
    }
}

/// `POST /auth/login`. Persists the token on success.
pub async fn login(api: &ApiClient, username: &str, password: &str) -> AdminResult<AuthSession> {
    validate_credentials(username, password)?;
    let password = Zeroizing::new(password.to_string());

    let resp: LoginResponse = api
        .post_public(
            "/auth/login",
            &LoginRequest {
                username: username.trim(),
                password: &password,
            },
        )
        .await
        .map_err(|e| match e {
            // Wrong credentials: show the server's message, not a session redirect.
            AdminError::Http { status: 401, message } => AdminError::Api(message),
            other => other,
        })?;

    let token = Zeroizing::new(resp.token);
    if token.trim().is_empty() {
        return Err(AdminError::Decode("login response without token".into()));
    }
    api.sessions()
        .save(&PersistedAuth::new(token.as_str(), Some(resp.user.clone())))?;
    info!(user_id = %resp.user.id, "login successful");

    Ok(AuthSession {
        expires_at: token_expiry(&token),
        user: resp.user,
    })
}

/// Restore the persisted session and confirm it with `POST /auth/verify-token`.
///
/// Returns `Ok(None)` when nothing is persisted or the stored token has
/// already expired (the entry is cleared in that case).
pub async fn verify_token(api: &ApiClient) -> AdminResult<Option<AuthSession>> {
    let Some(persisted) = api.sessions().load()? else {
        return Ok(None);
    };
    let expires_at = token_expiry(&persisted.token);
    if expires_at.is_some_and(|at| Utc::now() >= at) {
        warn!("persisted token expired, clearing it");
        api.sessions().clear()?;
        return Ok(None);
    }

    let user: User = api.post("/auth/verify-token", &Value::Null).await?;
    api.sessions()
        .save(&PersistedAuth::new(persisted.token.as_str(), Some(user.clone())))?;
    Ok(Some(AuthSession { user, expires_at }))
}

/// Forget the persisted session.
pub fn logout(api: &ApiClient) -> AdminResult<()> {
    api.sessions().clear()?;
    info!("logged out");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::client;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn jwt_with_exp(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"u1","exp":{exp}}}"#));
        format!("{header}.{payload}.signature")
    }

    fn user_json() -> Value {
        json!({
            "_id": "u1",
            "name": "Asha",
            "permissions": [{ "page": "orders", "actions": ["view"] }]
        })
    }

    #[test]
    fn reads_exp_claim() {
        let token = jwt_with_exp(1_900_000_000);
        assert_eq!(
            token_expiry(&token).map(|d| d.timestamp()),
            Some(1_900_000_000)
        );
        assert_eq!(token_expiry("opaque-token"), None);
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        let (api, _) = client("http://127.0.0.1:9", None);
        let Err(AdminError::Validation(fields)) = login(&api, " ", "").await else {
            panic!("expected validation error");
        };
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("password"));
    }

    #[tokio::test]
    async fn login_persists_token() {
        let server = MockServer::start().await;
        let token = jwt_with_exp(4_000_000_000);
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({ "username": "asha", "password": "pw" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "isSuccess": true,
                "data": { "token": token, "user": user_json() }
            })))
            .mount(&server)
            .await;

        let (api, store) = client(&server.uri(), None);
        let session = login(&api, " asha ", "pw").await.expect("login");
        assert_eq!(session.user.id, "u1");
        assert!(session.can("orders", "view"));
        assert!(!session.is_expired(Utc::now()));
        assert_eq!(store.load().unwrap().expect("persisted").token, token);
    }

    #[tokio::test]
    async fn verify_token_refreshes_user() {
        let server = MockServer::start().await;
        let token = jwt_with_exp(4_000_000_000);
        Mock::given(method("POST"))
            .and(path("/auth/verify-token"))
            .and(header("authorization", format!("Bearer {token}").as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "isSuccess": true, "data": user_json() })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (api, _) = client(&server.uri(), Some(&token));
        let session = verify_token(&api).await.expect("verify").expect("session");
        assert_eq!(session.user.name, "Asha");
    }

    #[tokio::test]
    async fn expired_token_is_dropped_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/verify-token"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (api, store) = client(&server.uri(), Some(&jwt_with_exp(1_000)));
        assert!(verify_token(&api).await.expect("verify").is_none());
        assert!(store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn nothing_persisted_means_logged_out() {
        let (api, _) = client("http://127.0.0.1:9", None);
        assert!(verify_token(&api).await.unwrap().is_none());
        logout(&api).expect("logout is idempotent");
    }
}
