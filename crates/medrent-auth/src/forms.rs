// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account forms and their client-side checks.
//!
//! Local validation only catches what can be decided without the backend;
//! the backend's own field errors come back as
//! [`MedrentError::Validation`].

use medrent_core::{MedrentError, Role, UserIdentity};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value, json};

/// A new account, either self-service or provisioned by an admin.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub email: String,
    pub password: SecretString,
    pub password_confirm: SecretString,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

impl RegistrationRequest {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        password_confirm: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
            password_confirm: SecretString::from(password_confirm.into()),
            first_name: String::new(),
            last_name: String::new(),
            role,
            phone_number: None,
            address: None,
        }
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    /// Checks that need no server round trip.
    pub fn validate(&self) -> Result<(), MedrentError> {
        validate_email(&self.email)?;
        if self.password.expose_secret().is_empty() {
            return Err(MedrentError::field("password", "Password must not be empty."));
        }
        if self.password.expose_secret() != self.password_confirm.expose_secret() {
            return Err(MedrentError::field("password2", "Password fields didn't match."));
        }
        Ok(())
    }

    /// The registration body, with the confirmation under `password2`.
    pub(crate) fn to_body(&self) -> Value {
        let mut body = json!({
            "email": self.email.trim(),
            "password": self.password.expose_secret(),
            "password2": self.password_confirm.expose_secret(),
            "first_name": self.first_name,
            "last_name": self.last_name,
            "role": self.role,
        });
        if let Value::Object(map) = &mut body {
            insert_opt(map, "phone_number", &self.phone_number);
            insert_opt(map, "address", &self.address);
        }
        body
    }
}

pub(crate) fn validate_email(email: &str) -> Result<(), MedrentError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(MedrentError::field("email", "Email must not be empty."));
    }
    if !email.contains('@') {
        return Err(MedrentError::field("email", "Enter a valid email address."));
    }
    Ok(())
}

/// Changes to the logged-in user's own profile. Unset fields keep their
/// current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The full `PUT` body: the current identity overlaid with the changes.
    pub(crate) fn apply_to(&self, current: &UserIdentity) -> Result<Value, MedrentError> {
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        let pick = |new: &Option<String>, old: &str| new.clone().unwrap_or_else(|| old.to_string());

        let mut body = Map::new();
        body.insert("email".into(), pick(&self.email, &current.email).into());
        body.insert(
            "first_name".into(),
            pick(&self.first_name, &current.first_name).into(),
        );
        body.insert(
            "last_name".into(),
            pick(&self.last_name, &current.last_name).into(),
        );
        let phone = self.phone_number.clone().or_else(|| current.phone_number.clone());
        insert_opt(&mut body, "phone_number", &phone);
        let address = self.address.clone().or_else(|| current.address.clone());
        insert_opt(&mut body, "address", &address);
        Ok(Value::Object(body))
    }
}

/// Password change for the logged-in user.
#[derive(Debug, Clone)]
pub struct PasswordChange {
    pub old_password: SecretString,
    pub new_password: SecretString,
    pub confirm_password: SecretString,
}

impl PasswordChange {
    pub fn new(
        old_password: impl Into<String>,
        new_password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            old_password: SecretString::from(old_password.into()),
            new_password: SecretString::from(new_password.into()),
            confirm_password: SecretString::from(confirm_password.into()),
        }
    }

    pub fn validate(&self) -> Result<(), MedrentError> {
        if self.new_password.expose_secret().is_empty() {
            return Err(MedrentError::field(
                "new_password",
                "Password must not be empty.",
            ));
        }
        if self.new_password.expose_secret() != self.confirm_password.expose_secret() {
            return Err(MedrentError::field(
                "new_password",
                "Password fields didn't match.",
            ));
        }
        Ok(())
    }

    pub(crate) fn to_body(&self) -> Value {
        json!({
            "old_password": self.old_password.expose_secret(),
            "new_password": self.new_password.expose_secret(),
            "confirm_password": self.confirm_password.expose_secret(),
        })
    }
}

fn insert_opt(map: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        map.insert(key.to_string(), Value::String(value.clone()));
    }
}
