//! Back-office REST client.
//!
//! Every request carries `Authorization: Bearer <token>` when a session is
//! persisted. Responses use the `{ isSuccess, data?, error?: { description } }`
//! envelope and are decoded into [`ApiResponse`]. A 401 clears the persisted
//! session and surfaces [`AdminError::Unauthorized`]; the caller turns that
//! into a login redirect.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::normalize_base_url;
use crate::error::{AdminError, AdminResult};
use crate::storage::SessionStore;

/// Error body inside a failed envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub description: String,
}

/// Tagged form of the response envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Ok(T),
    Err(ApiError),
}

impl<T> ApiResponse<T> {
    pub fn into_result(self) -> AdminResult<T> {
        match self {
            ApiResponse::Ok(data) => Ok(data),
            ApiResponse::Err(err) => Err(AdminError::Api(err.description)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    #[serde(default)]
    is_success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<ApiError>,
}

const DEFAULT_FAILURE: &str = "Request failed";

/// Decode an envelope body into a tagged response.
pub fn decode_envelope<T: DeserializeOwned>(body: &str) -> AdminResult<ApiResponse<T>> {
    let envelope: Envelope = if body.trim().is_empty() {
        Envelope {
            is_success: true,
            data: None,
            error: None,
        }
    } else {
        serde_json::from_str(body).map_err(|e| AdminError::Decode(e.to_string()))?
    };

    if !envelope.is_success {
        let description = envelope
            .error
            .map(|e| e.description)
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FAILURE.to_string());
        return Ok(ApiResponse::Err(ApiError { description }));
    }

    // Endpoints such as DELETE may succeed without a payload.
    let data = envelope.data.unwrap_or(Value::Null);
    serde_json::from_value::<T>(data)
        .map(ApiResponse::Ok)
        .map_err(|e| AdminError::Decode(e.to_string()))
}

fn transport_error(url: &str, err: &reqwest::Error) -> AdminError {
    if err.is_connect() {
        return AdminError::Unreachable {
            url: url.to_string(),
        };
    }
    if err.is_timeout() {
        return AdminError::Timeout {
            url: url.to_string(),
        };
    }
    if err.is_builder() {
        return AdminError::Config(format!("Invalid API URL: {url}"));
    }
    AdminError::Network(err.to_string())
}

fn status_message(status: StatusCode) -> String {
    match status.as_u16() {
        401 => "Invalid credentials".to_string(),
        403 => "You are not allowed to perform this action".to_string(),
        404 => "Resource not found".to_string(),
        s if s >= 500 => "Back-office server error".to_string(),
        _ => "Unexpected response from the back-office API".to_string(),
    }
}

pub struct ApiClient {
    base_url: String,
    http: Client,
    sessions: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        sessions: Arc<dyn SessionStore>,
    ) -> AdminResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdminError::Config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            base_url: normalize_base_url(base_url),
            http,
            sessions,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AdminResult<T> {
        self.send(Method::GET, path, query, None).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AdminResult<T> {
        self.send(Method::POST, path, &[], Some(to_body(body)?))
            .await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AdminResult<T> {
        self.send(Method::PUT, path, &[], Some(to_body(body)?))
            .await
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AdminResult<T> {
        self.send(Method::PATCH, path, &[], Some(to_body(body)?))
            .await
    }

    /// POST without the persisted session, for credential exchanges. A 401
    /// here is a rejected credential, not an expired session: nothing is
    /// cleared and the server's description is returned as an HTTP error.
    pub async fn post_public<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AdminResult<T> {
        self.dispatch(Method::POST, path, &[], Some(to_body(body)?), false)
            .await
    }

    pub async fn delete(&self, path: &str) -> AdminResult<()> {
        let _: Value = self.send(Method::DELETE, path, &[], None).await?;
        Ok(())
    }

    /// Perform one request and decode the envelope.
    ///
    /// `path` includes the leading slash, e.g. `/menu/items`.
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> AdminResult<T> {
        self.dispatch(method, path, query, body, true).await
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
        with_session: bool,
    ) -> AdminResult<T> {
        validate_api_path(path)?;
        let url = format!("{}{}", self.base_url, path);
        let request_id = Uuid::new_v4();

        let mut req = self
            .http
            .request(method.clone(), &url)
            .header("X-Request-Id", request_id.to_string())
            .header("Accept", "application/json");
        if !query.is_empty() {
            req = req.query(query);
        }
        if with_session {
            if let Some(auth) = self.sessions.load()? {
                req = req.bearer_auth(&auth.token);
            }
        }
        if let Some(b) = body {
            req = req.json(&b);
        }

        let start = Instant::now();
        let resp = req
            .send()
            .await
            .map_err(|e| transport_error(&self.base_url, &e))?;
        let status = resp.status();
        let latency_ms = start.elapsed().as_millis() as u64;
        debug!(
            %method,
            path,
            status = status.as_u16(),
            latency_ms,
            request_id = %request_id,
            "api request completed"
        );

        if with_session && status == StatusCode::UNAUTHORIZED {
            warn!(path, "api returned 401, clearing persisted session");
            self.sessions.clear()?;
            return Err(AdminError::Unauthorized);
        }

        let body_text = resp
            .text()
            .await
            .map_err(|e| AdminError::Network(format!("reading response body: {e}")))?;

        if !status.is_success() {
            let message = match decode_envelope::<Value>(&body_text) {
                Ok(ApiResponse::Err(err)) if err.description != DEFAULT_FAILURE => {
                    err.description
                }
                _ => status_message(status),
            };
            return Err(AdminError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let response = decode_envelope::<T>(&body_text)?;
        if let ApiResponse::Err(ref err) = response {
            info!(path, error = %err.description, "api reported failure");
        }
        response.into_result()
    }

    /// Unauthenticated round trip to the base URL. Any HTTP answer counts as
    /// reachable; returns the latency in milliseconds.
    pub async fn ping(&self) -> AdminResult<u64> {
        let start = Instant::now();
        self.http
            .get(&self.base_url)
            .send()
            .await
            .map_err(|e| transport_error(&self.base_url, &e))?;
        Ok(start.elapsed().as_millis() as u64)
    }
}

fn to_body<B: Serialize + ?Sized>(body: &B) -> AdminResult<Value> {
    serde_json::to_value(body).map_err(|e| AdminError::Decode(format!("encode request: {e}")))
}

/// Reject paths that would escape the API base URL.
pub fn validate_api_path(path: &str) -> AdminResult<()> {
    if path.trim().is_empty() || !path.starts_with('/') {
        return Err(AdminError::Config(format!("Invalid API path: {path:?}")));
    }
    if path.contains("..") || path.contains("://") {
        return Err(AdminError::Config(format!("Invalid API path: {path:?}")));
    }
    Ok(())
}

/// Percent-encode one path segment (ids from the server are opaque).
pub fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for b in segment.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// Inverse of [`encode_segment`]. Malformed escapes are kept literally.
pub fn decode_segment(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(b) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::db::DbState;
    use crate::storage::{PersistedAuth, SqliteSessionStore};

    /// Client pointed at `base_url` with a fresh in-memory session store.
    pub fn client(base_url: &str, token: Option<&str>) -> (ApiClient, Arc<dyn SessionStore>) {
        let store: Arc<dyn SessionStore> = Arc::new(SqliteSessionStore::new(Arc::new(
            DbState::in_memory().expect("db"),
        )));
        if let Some(token) = token {
            store
                .save(&PersistedAuth::new(token, None))
                .expect("seed session");
        }
        let client = ApiClient::new(base_url, Duration::from_secs(5), store.clone())
            .expect("client");
        (client, store)
    }
}
