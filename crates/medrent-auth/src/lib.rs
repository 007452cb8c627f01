// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication for the Medrent client.
//!
//! [`AuthManager`] owns the login/logout lifecycle on top of an
//! [`ApiClient`](medrent_api::ApiClient) and its session store.

pub mod forms;
pub mod manager;

pub use forms::{PasswordChange, ProfileUpdate, RegistrationRequest};
pub use manager::AuthManager;
