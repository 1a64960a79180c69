//! Error type shared by the API client, services, storage and page actions.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::order_status::OrderStatus;

/// Field name -> human readable message, rendered inline next to form fields.
pub type FieldErrors = BTreeMap<String, String>;

/// How an error is surfaced to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network or HTTP failure: toast / inline banner.
    Network,
    /// Client-side validation failure: inline field errors.
    Validation,
    /// Missing or expired session, or missing permission: redirect.
    Authorization,
}

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Cannot reach the back-office API at {url}")]
    Unreachable { url: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("{message} (HTTP {status})")]
    Http { status: u16, message: String },

    /// The server answered `isSuccess: false`.
    #[error("{0}")]
    Api(String),

    #[error("Invalid response from the back-office API: {0}")]
    Decode(String),

    #[error("Please correct the highlighted fields")]
    Validation(FieldErrors),

    #[error("Session expired or missing, please log in again")]
    Unauthorized,

    #[error("You do not have permission to {action} {page}")]
    Forbidden { page: String, action: String },

    #[error("Invalid transition: cannot move an order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type AdminResult<T> = Result<T, AdminError>;

impl AdminError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AdminError::Validation(_) | AdminError::InvalidTransition { .. } => {
                ErrorCategory::Validation
            }
            AdminError::Unauthorized | AdminError::Forbidden { .. } => {
                ErrorCategory::Authorization
            }
            _ => ErrorCategory::Network,
        }
    }

    /// Build a single-field validation error.
    pub fn field(name: &str, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(name.to_string(), message.into());
        AdminError::Validation(fields)
    }
}

impl From<rusqlite::Error> for AdminError {
    fn from(err: rusqlite::Error) -> Self {
        AdminError::Storage(err.to_string())
    }
}

impl From<keyring::Error> for AdminError {
    fn from(err: keyring::Error) -> Self {
        AdminError::Storage(format!("credential store: {err}"))
    }
}

impl From<config::ConfigError> for AdminError {
    fn from(err: config::ConfigError) -> Self {
        AdminError::Config(err.to_string())
    }
}
