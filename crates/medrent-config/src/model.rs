// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Medrent client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of silently ignored.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level Medrent configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MedrentConfig {
    /// Backend connection settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Where session credentials are kept between runs.
    #[serde(default)]
    pub session: SessionConfig,

    /// Notification polling settings.
    #[serde(default)]
    pub notifications: NotificationsConfig,

    /// Log output settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// REST backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL including the `/api` prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Value of the `User-Agent` header.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Reject plain-HTTP base URLs unless they point at localhost.
    #[serde(default = "default_require_tls")]
    pub require_tls: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            require_tls: default_require_tls(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("medrent/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_require_tls() -> bool {
    true
}

/// Token persistence backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// JSON file on disk; survives restarts.
    #[default]
    File,
    /// Process memory only.
    Memory,
}

/// Session persistence configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    #[serde(default)]
    pub store: StoreKind,

    /// Token file location. `None` uses `<data dir>/medrent/session.json`.
    #[serde(default)]
    pub path: Option<String>,
}

impl SessionConfig {
    /// Resolves the token file path, falling back to the platform data dir.
    pub fn resolved_path(&self) -> PathBuf {
        match &self.path {
            Some(p) => PathBuf::from(p),
            None => dirs::data_dir()
                .map(|d| d.join("medrent").join("session.json"))
                .unwrap_or_else(|| PathBuf::from("medrent-session.json")),
        }
    }
}

/// Notification polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationsConfig {
    #[serde(default = "default_notifications_enabled")]
    pub enabled: bool,

    /// Seconds between background refreshes of the notification list.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: default_notifications_enabled(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

fn default_notifications_enabled() -> bool {
    true
}

fn default_poll_interval_secs() -> u64 {
    60
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_backend() {
        let config = MedrentConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.api.user_agent.starts_with("medrent/"));
        assert_eq!(config.session.store, StoreKind::File);
        assert_eq!(config.notifications.poll_interval_secs, 60);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn explicit_session_path_wins() {
        let session = SessionConfig {
            store: StoreKind::File,
            path: Some("/tmp/tokens.json".into()),
        };
        assert_eq!(session.resolved_path(), PathBuf::from("/tmp/tokens.json"));
    }

    #[test]
    fn default_session_path_ends_with_session_json() {
        let session = SessionConfig::default();
        let path = session.resolved_path();
        assert!(path.to_string_lossy().ends_with("session.json"));
    }

    #[test]
    fn store_kind_parses_lowercase() {
        let config: MedrentConfig = toml::from_str("[session]\nstore = \"memory\"\n").unwrap();
        assert_eq!(config.session.store, StoreKind::Memory);
    }

    #[test]
    fn unknown_store_kind_is_rejected() {
        let result = toml::from_str::<MedrentConfig>("[session]\nstore = \"redis\"\n");
        assert!(result.is_err());
    }
}
