// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON file token store.
//!
//! The file holds exactly two values under fixed keys:
//!
//! ```json
//! {"access_token": "...", "refresh_token": "..."}
//! ```
//!
//! Writes go to a sibling temp file that is renamed into place, so a crash
//! never leaves a half-written token file. On unix the file is created with
//! mode 0600.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use medrent_core::{MedrentError, TokenPair, TokenStore};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct PersistedTokens {
    access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

/// Token store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "session.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn storage_err(e: impl std::error::Error + Send + Sync + 'static) -> MedrentError {
    MedrentError::Storage {
        source: Box::new(e),
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn load(&self) -> Result<Option<TokenPair>, MedrentError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_err(e)),
        };

        let persisted: PersistedTokens = serde_json::from_slice(&raw).map_err(storage_err)?;
        if persisted.access_token.is_empty() {
            return Ok(None);
        }
        debug!(path = %self.path.display(), "loaded persisted session tokens");
        Ok(Some(TokenPair::new(
            persisted.access_token,
            persisted.refresh_token.filter(|r| !r.is_empty()),
        )))
    }

    async fn save(&self, tokens: &TokenPair) -> Result<(), MedrentError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(storage_err)?;
        }

        let body = serde_json::to_vec(&PersistedTokens {
            access_token: tokens.access.expose_secret().to_string(),
            refresh_token: tokens.refresh.as_ref().map(|r| r.expose_secret().to_string()),
        })
        .map_err(storage_err)?;

        let tmp = self.temp_path();
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&tmp).await.map_err(storage_err)?;
        file.write_all(&body).await.map_err(storage_err)?;
        file.sync_all().await.map_err(storage_err)?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(storage_err)?;
        debug!(path = %self.path.display(), "persisted session tokens");
        Ok(())
    }

    async fn clear(&self) -> Result<(), MedrentError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "removed persisted session tokens");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_err(e)),
        }
    }
}
