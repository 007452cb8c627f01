// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session, identity, and notification types shared across the Medrent crates.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Backend role of an authenticated user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Client,
}

/// Snapshot of the logged-in user as reported by `/accounts/me/`.
///
/// Never patched in place: a profile update replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: u64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl UserIdentity {
    /// "First Last", falling back to the email when both names are blank.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Access/refresh credential pair.
///
/// Debug output never includes the token material.
#[derive(Clone)]
pub struct TokenPair {
    pub access: SecretString,
    pub refresh: Option<SecretString>,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: Option<String>) -> Self {
        Self {
            access: SecretString::from(access.into()),
            refresh: refresh.map(SecretString::from),
        }
    }

    /// True when both pairs carry the same access token.
    pub fn same_access(&self, other: &TokenPair) -> bool {
        self.access.expose_secret() == other.access.expose_secret()
    }
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"[REDACTED]")
            .field("refresh", &self.refresh.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// In-memory session state.
///
/// `Authenticated` carries both credentials and identity, so no observable
/// state has one without the other. `Restoring` exists only while persisted
/// tokens are being validated at startup and does not count as logged in.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Restoring {
        tokens: TokenPair,
    },
    Authenticated {
        tokens: TokenPair,
        user: UserIdentity,
    },
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }

    pub fn tokens(&self) -> Option<&TokenPair> {
        match self {
            SessionState::Unauthenticated => None,
            SessionState::Restoring { tokens } | SessionState::Authenticated { tokens, .. } => {
                Some(tokens)
            }
        }
    }

    pub fn user(&self) -> Option<&UserIdentity> {
        match self {
            SessionState::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }
}

/// Session transitions broadcast to interested components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn(UserIdentity),
    ProfileUpdated(UserIdentity),
    TokenRefreshed,
    LoggedOut,
    /// The session was cleared by an authentication failure; the user must
    /// log in again.
    LoginRequired { reason: String },
}

/// A user notification as served by `/notifications/notifications/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    pub message: String,
    #[serde(default = "default_notification_type")]
    pub notification_type: String,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_object_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_object_id: Option<u64>,
    pub created_at: DateTime<Utc>,
}

fn default_notification_type() -> String {
    "system".to_string()
}

fn default_priority() -> String {
    "medium".to_string()
}
