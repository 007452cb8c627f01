// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Medrent client.
//!
//! This crate provides the error taxonomy, the session and notification
//! types, and the storage trait used throughout the workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{FieldErrors, MedrentError};
pub use traits::TokenStore;
pub use types::{Notification, Role, SessionEvent, SessionState, TokenPair, UserIdentity};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn medrent_error_has_all_variants() {
        let _credentials = MedrentError::InvalidCredentials("bad".into());
        let _expired = MedrentError::AuthExpired("refresh rejected".into());
        let _unauthorized = MedrentError::Unauthorized("401".into());
        let _network = MedrentError::Network {
            message: "refused".into(),
            source: None,
        };
        let _validation = MedrentError::validation("bad form");
        let _denied = MedrentError::PermissionDenied("admin only".into());
        let _not_found = MedrentError::NotFound("order 9".into());
        let _server = MedrentError::Server {
            status: 500,
            message: "boom".into(),
        };
        let _timeout = MedrentError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _cancelled = MedrentError::Cancelled;
        let _config = MedrentError::Config("test".into());
        let _storage = MedrentError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _internal = MedrentError::Internal("test".into());
    }

    #[test]
    fn token_store_is_object_safe() {
        fn _assert_dyn(_: &dyn TokenStore) {}
    }
}
