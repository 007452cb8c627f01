// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence trait for session credentials.

use async_trait::async_trait;

use crate::error::MedrentError;
use crate::types::TokenPair;

/// Durable storage for the access/refresh token pair.
///
/// Only the two token strings are persisted; the user identity is always
/// re-fetched from the backend after a restart.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Short backend name for logs ("file", "memory").
    fn name(&self) -> &str;

    /// Returns the stored pair, or `None` when nothing has been saved.
    async fn load(&self) -> Result<Option<TokenPair>, MedrentError>;

    /// Replaces the stored pair.
    async fn save(&self, tokens: &TokenPair) -> Result<(), MedrentError>;

    /// Removes any stored pair. Clearing an empty store is not an error.
    async fn clear(&self) -> Result<(), MedrentError>;
}
