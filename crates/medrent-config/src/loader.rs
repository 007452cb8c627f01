// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `/etc/medrent/medrent.toml`, `~/.config/medrent/medrent.toml`,
//! `./medrent.toml`, then `MEDRENT_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::MedrentConfig;

/// Top-level sections that environment variables may target.
const SECTIONS: &[&str] = &["api", "session", "notifications", "log"];

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/medrent/medrent.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "medrent.toml";

/// Path of the per-user config file, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("medrent").join("medrent.toml"))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/medrent/medrent.toml`
/// 3. `~/.config/medrent/medrent.toml`
/// 4. `./medrent.toml`
/// 5. `MEDRENT_*` environment variables
pub fn load_config() -> Result<MedrentConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<MedrentConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MedrentConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MedrentConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MedrentConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment behind [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(MedrentConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `MEDRENT_<SECTION>_<KEY>` to `section.key`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `MEDRENT_API_BASE_URL` maps to `api.base_url`, not `api.base.url`.
fn env_provider() -> Env {
    Env::prefixed("MEDRENT_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("api_base_url"), "api.base_url");
        assert_eq!(map_env_key("api_timeout_secs"), "api.timeout_secs");
        assert_eq!(map_env_key("session_path"), "session.path");
        assert_eq!(
            map_env_key("notifications_poll_interval_secs"),
            "notifications.poll_interval_secs"
        );
        assert_eq!(map_env_key("log_level"), "log.level");
    }

    #[test]
    fn unknown_env_keys_pass_through() {
        assert_eq!(map_env_key("apiary"), "apiary");
        assert_eq!(map_env_key("other_key"), "other_key");
    }

    #[test]
    fn env_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
[api]
base_url = "https://rent.example.org/api"
timeout_secs = 10
"#,
            )?;
            jail.set_env("MEDRENT_API_TIMEOUT_SECS", "45");
            jail.set_env("MEDRENT_LOG_LEVEL", "debug");

            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.api.base_url, "https://rent.example.org/api");
            assert_eq!(config.api.timeout_secs, 45);
            assert_eq!(config.log.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn local_file_is_picked_up() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                LOCAL_CONFIG_FILE,
                "[notifications]\npoll_interval_secs = 15\n",
            )?;
            let config = load_config()?;
            assert_eq!(config.notifications.poll_interval_secs, 15);
            Ok(())
        });
    }
}
