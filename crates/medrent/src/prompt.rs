// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password acquisition via TTY prompt or the `MEDRENT_PASSWORD`
//! environment variable.

use std::io::IsTerminal;

use medrent_core::MedrentError;
use secrecy::{ExposeSecret, SecretString};

/// Environment variable consulted before prompting, for scripted logins.
pub const PASSWORD_ENV_VAR: &str = "MEDRENT_PASSWORD";

/// The account password from `MEDRENT_PASSWORD`, or an interactive prompt.
pub fn password(prompt: &str) -> Result<SecretString, MedrentError> {
    if let Ok(value) = std::env::var(PASSWORD_ENV_VAR)
        && !value.is_empty()
    {
        return Ok(SecretString::from(value));
    }
    read_tty(prompt)
}

/// A new password typed twice. Never read from the environment.
pub fn new_password(prompt: &str) -> Result<(SecretString, SecretString), MedrentError> {
    let first = read_tty(prompt)?;
    let second = read_tty("Confirm password: ")?;
    if first.expose_secret().is_empty() {
        return Err(MedrentError::field("password", "Password must not be empty."));
    }
    Ok((first, second))
}

fn read_tty(prompt: &str) -> Result<SecretString, MedrentError> {
    if !std::io::stdin().is_terminal() {
        return Err(MedrentError::validation(format!(
            "no password provided; set {PASSWORD_ENV_VAR} or run interactively"
        )));
    }
    eprint!("{prompt}");
    let value = rpassword::read_password()
        .map_err(|e| MedrentError::Internal(format!("failed to read password: {e}")))?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn password_comes_from_env_when_set() {
        // SAFETY: serialized with the other env-mutating tests in this crate.
        unsafe { std::env::set_var(PASSWORD_ENV_VAR, "from-env") };
        let pw = password("Password: ").unwrap();
        unsafe { std::env::remove_var(PASSWORD_ENV_VAR) };
        assert_eq!(pw.expose_secret(), "from-env");
    }

    #[test]
    #[serial]
    fn empty_env_value_is_ignored() {
        unsafe { std::env::set_var(PASSWORD_ENV_VAR, "") };
        let result = password("Password: ");
        unsafe { std::env::remove_var(PASSWORD_ENV_VAR) };
        // Under the test runner stdin is not a terminal, so the prompt is refused.
        if !std::io::stdin().is_terminal() {
            assert!(matches!(result, Err(MedrentError::Validation { .. })));
        }
    }
}
