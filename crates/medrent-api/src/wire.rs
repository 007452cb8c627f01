// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request and response bodies of the account/token endpoints.

use medrent_core::UserIdentity;
use serde::{Deserialize, Serialize};

/// Endpoint that exchanges credentials for a token pair.
pub const TOKEN_PATH: &str = "/accounts/token/";
/// Endpoint that exchanges a refresh token for a new access token.
pub const TOKEN_REFRESH_PATH: &str = "/accounts/token/refresh/";
pub const REGISTER_PATH: &str = "/accounts/register/";
pub const ME_PATH: &str = "/accounts/me/";
pub const LOGOUT_PATH: &str = "/accounts/logout/";
pub const CHANGE_PASSWORD_PATH: &str = "/accounts/change-password/";

/// Token endpoints never go through 401 renewal.
pub fn is_token_endpoint(path: &str) -> bool {
    path == TOKEN_PATH || path == TOKEN_REFRESH_PATH
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Issued by login and registration.
///
/// `user` is optional on the wire; when the backend leaves it out the
/// identity is fetched from `/accounts/me/` before the session is installed.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
    #[serde(default)]
    pub user: Option<UserIdentity>,
}

#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// The refresh token is only present when the backend rotates it.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}
