// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Collects every problem instead of stopping at the first one.

use crate::diagnostic::ConfigError;
use crate::model::{MedrentConfig, StoreKind};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Shortest allowed notification poll interval.
pub const MIN_POLL_INTERVAL_SECS: u64 = 5;

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &MedrentConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if let Err(message) = check_base_url(&config.api.base_url, config.api.require_tls) {
        errors.push(ConfigError::Validation { message });
    }

    if config.api.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "api.timeout_secs must be greater than 0".to_string(),
        });
    }

    if config.api.user_agent.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "api.user_agent must not be empty".to_string(),
        });
    }

    if config.session.store == StoreKind::File
        && let Some(path) = &config.session.path
        && path.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "session.path must not be empty when set".to_string(),
        });
    }

    if config.notifications.enabled
        && config.notifications.poll_interval_secs < MIN_POLL_INTERVAL_SECS
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "notifications.poll_interval_secs must be at least {MIN_POLL_INTERVAL_SECS}, got {}",
                config.notifications.poll_interval_secs
            ),
        });
    }

    if !LOG_LEVELS.contains(&config.log.level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Base URL must be absolute http(s); remote hosts need https when TLS is required.
fn check_base_url(base_url: &str, require_tls: bool) -> Result<(), String> {
    let parsed = url::Url::parse(base_url)
        .map_err(|e| format!("api.base_url `{base_url}` is not a valid URL: {e}"))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(format!(
                "api.base_url must use http or https, got `{other}`"
            ));
        }
    }

    let host = parsed.host_str().unwrap_or("");
    if require_tls && parsed.scheme() != "https" && !is_localhost(host) {
        return Err(format!(
            "api.base_url `{base_url}` must use https for remote hosts (set api.require_tls = false to override)"
        ));
    }

    Ok(())
}

/// Check if a host refers to the local machine.
pub fn is_localhost(host: &str) -> bool {
    matches!(host, "127.0.0.1" | "::1" | "localhost" | "[::1]") || host.starts_with("127.")
}
