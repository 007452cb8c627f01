// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Medrent configuration system.

use medrent_config::diagnostic::ConfigError;
use medrent_config::model::{MedrentConfig, StoreKind};
use medrent_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_medrent_config() {
    let toml = r#"
[api]
base_url = "https://rent.example.org/api"
timeout_secs = 12
user_agent = "ops-console"
require_tls = true

[session]
store = "memory"
path = "/tmp/session.json"

[notifications]
enabled = false
poll_interval_secs = 120

[log]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.api.base_url, "https://rent.example.org/api");
    assert_eq!(config.api.timeout_secs, 12);
    assert_eq!(config.api.user_agent, "ops-console");
    assert_eq!(config.session.store, StoreKind::Memory);
    assert_eq!(config.session.path.as_deref(), Some("/tmp/session.json"));
    assert!(!config.notifications.enabled);
    assert_eq!(config.notifications.poll_interval_secs, 120);
    assert_eq!(config.log.level, "debug");
}

/// Missing optional sections use defaults without error.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    let defaults = MedrentConfig::default();
    assert_eq!(config.api.base_url, defaults.api.base_url);
    assert_eq!(config.api.timeout_secs, 30);
    assert!(config.api.require_tls);
    assert_eq!(config.session.store, StoreKind::File);
    assert!(config.session.path.is_none());
    assert!(config.notifications.enabled);
}

/// Unknown top-level section is rejected by deny_unknown_fields.
#[test]
fn unknown_section_is_rejected() {
    let toml = r#"
[agent]
name = "x"
"#;
    let err = load_config_from_str(toml).expect_err("unknown section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("agent"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// A typo inside [api] yields an UnknownKey diagnostic with a suggestion.
#[test]
fn typo_in_api_section_suggests_fix() {
    let toml = r#"
[api]
base_ulr = "https://rent.example.org/api"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "base_ulr"
                && suggestion.as_deref() == Some("base_url")
                && valid_keys.contains("timeout_secs")
        })
    });
    assert!(found, "expected UnknownKey for base_ulr, got: {errors:?}");
}

/// The inline source is attached so miette can point at the key.
#[test]
fn unknown_key_carries_source_span() {
    let toml = "[log]\nlevle = \"info\"\n";
    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let span = errors.iter().find_map(|e| match e {
        ConfigError::UnknownKey { span, .. } => *span,
        _ => None,
    });
    let span = span.expect("span should be resolved for inline source");
    assert_eq!(&toml[span.offset()..span.offset() + span.len()], "levle");
}

/// Wrong value type is reported as InvalidType with the dotted key.
#[test]
fn wrong_type_is_reported() {
    let toml = r#"
[api]
timeout_secs = "thirty"
"#;
    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("timeout_secs"))),
        "got: {errors:?}"
    );
}

/// Validation runs after a successful parse.
#[test]
fn validation_rejects_plain_http_remote() {
    let toml = r#"
[api]
base_url = "http://rent.example.org/api"
"#;
    let errors = load_and_validate_str(toml).expect_err("remote http should fail");
    assert!(errors.iter().any(|e| matches!(e, ConfigError::Validation { .. })));
}

/// ConfigError renders through miette's graphical handler.
#[test]
fn config_error_renders_with_miette() {
    use miette::GraphicalReportHandler;

    let error = ConfigError::UnknownKey {
        key: "base_ulr".to_string(),
        suggestion: Some("base_url".to_string()),
        valid_keys: "base_url, timeout_secs".to_string(),
        span: None,
        src: None,
    };

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(buf.contains("base_ulr"));
    assert!(buf.contains("did you mean `base_url`"));
}

/// Figment's missing-file behavior: nonexistent files are skipped.
#[test]
fn missing_config_file_is_skipped() {
    let config = medrent_config::load_config_from_path(std::path::Path::new(
        "/nonexistent/medrent.toml",
    ))
    .expect("missing file should be skipped");
    assert_eq!(config.log.level, MedrentConfig::default().log.level);
}
