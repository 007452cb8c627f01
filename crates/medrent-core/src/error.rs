// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Medrent client.

use std::collections::BTreeMap;

use thiserror::Error;

/// Field-level validation messages keyed by field name, as returned by the
/// backend for rejected forms (`{"email": ["already registered"]}`).
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// The primary error type used across the Medrent crates.
#[derive(Debug, Error)]
pub enum MedrentError {
    /// Login or registration rejected the supplied credentials (backend 400/401).
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The session could not be renewed; the user must log in again.
    #[error("session expired: {0}")]
    AuthExpired(String),

    /// A request was rejected with 401 and no renewal was attempted.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Transport failure (connection refused, DNS, TLS, malformed response).
    #[error("network error: {message}")]
    Network {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend (or local pre-validation) rejected the submitted data.
    #[error("validation error: {message}")]
    Validation { message: String, fields: FieldErrors },

    /// The authenticated user lacks the role required for the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend failed with a 5xx status.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// The caller abandoned the operation before it completed.
    #[error("operation cancelled")]
    Cancelled,

    /// Configuration errors (invalid TOML, bad base URL, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Local token persistence failed.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A batch operation failed for some of its items; the others succeeded.
    #[error("{} item(s) failed ({failed:?}): {source}", failed.len())]
    PartialFailure {
        failed: Vec<u64>,
        source: Box<MedrentError>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MedrentError {
    /// Builds a [`MedrentError::Validation`] with no per-field detail.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            fields: FieldErrors::new(),
        }
    }

    /// Builds a [`MedrentError::Validation`] for a single field.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec![message.clone()]);
        Self::Validation {
            message: format!("{field}: {message}"),
            fields,
        }
    }

    /// True for the failures that end the local session.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            MedrentError::AuthExpired(_) | MedrentError::Unauthorized(_)
        )
    }

    /// True for failures where no server response was obtained.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            MedrentError::Network { .. } | MedrentError::Timeout { .. } | MedrentError::Cancelled
        )
    }
}
