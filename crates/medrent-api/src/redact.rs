// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential redaction for log output and error messages.
//!
//! Two complementary mechanisms:
//! 1. **Regex-based**: bearer headers, JWTs, and token/password JSON fields.
//! 2. **Exact-match**: token values registered at runtime once they are known.

use std::io::Write;
use std::sync::{Arc, LazyLock, RwLock};

use regex::Regex;

/// Known credential patterns to redact from output.
static REDACTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Bearer tokens in headers
        r"Bearer\s+[a-zA-Z0-9._\-]{10,}",
        // JWTs (header.payload.signature, header always starts with `{"`)
        r"eyJ[a-zA-Z0-9_\-]+\.[a-zA-Z0-9_\-]+\.[a-zA-Z0-9_\-]+",
        // Credential-bearing JSON fields
        r#""(access|refresh|password|password2|old_password|new_password|confirm_password)"\s*:\s*"[^"]*""#,
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// The redaction placeholder.
pub const REDACTED: &str = "[REDACTED]";

/// Redact credentials from a string using the built-in patterns and any
/// exact values supplied by the caller.
pub fn redact(input: &str, known_secrets: &[String]) -> String {
    let mut result = input.to_string();

    for pattern in REDACTION_PATTERNS.iter() {
        result = pattern
            .replace_all(&result, |caps: &regex::Captures<'_>| match caps.get(1) {
                Some(field) => format!("\"{}\":\"{REDACTED}\"", field.as_str()),
                None => REDACTED.to_string(),
            })
            .into_owned();
    }

    // Longest first so a value is never partially masked by its own prefix.
    let mut sorted: Vec<&String> = known_secrets.iter().collect();
    sorted.sort_by_key(|v| std::cmp::Reverse(v.len()));
    for value in sorted {
        if !value.is_empty() {
            result = result.replace(value.as_str(), REDACTED);
        }
    }

    result
}

/// Shared list of exact values to mask, filled in as tokens are issued.
#[derive(Debug, Clone, Default)]
pub struct SecretRegistry {
    values: Arc<RwLock<Vec<String>>>,
}

impl SecretRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a value; duplicates and empty strings are ignored.
    pub fn add(&self, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        if let Ok(mut values) = self.values.write()
            && !values.contains(&value)
        {
            values.push(value);
        }
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.values.read().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.values.read().map(|v| v.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A writer wrapper that redacts credentials from output.
///
/// Used as the tracing writer so that no token reaches stderr.
pub struct RedactingWriter<W> {
    inner: W,
    secrets: SecretRegistry,
}

impl<W: Write> RedactingWriter<W> {
    pub fn new(inner: W, secrets: SecretRegistry) -> Self {
        Self { inner, secrets }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let input = String::from_utf8_lossy(buf);
        let redacted = redact(&input, &self.secrets.snapshot());
        self.inner.write_all(redacted.as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
