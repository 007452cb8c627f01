// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-local token store.

use std::sync::Mutex;

use async_trait::async_trait;
use medrent_core::{MedrentError, TokenPair, TokenStore};

/// Keeps the token pair in memory; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Option<TokenPair>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a pair, as if saved by an earlier run.
    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            tokens: Mutex::new(Some(tokens)),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<TokenPair>> {
        self.tokens.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self) -> Result<Option<TokenPair>, MedrentError> {
        Ok(self.slot().clone())
    }

    async fn save(&self, tokens: &TokenPair) -> Result<(), MedrentError> {
        *self.slot() = Some(tokens.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), MedrentError> {
        *self.slot() = None;
        Ok(())
    }
}
