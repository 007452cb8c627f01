// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full client stack (session store, API
//! client, auth manager, notification cache) against a [`MockBackend`],
//! persisting tokens in a temp directory so a "restart" can be simulated
//! with [`TestHarness::reopen`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use medrent_api::ApiClient;
use medrent_auth::AuthManager;
use medrent_config::model::ApiConfig;
use medrent_core::{MedrentError, TokenStore, UserIdentity};
use medrent_notify::NotificationCache;
use medrent_session::{FileTokenStore, MemoryTokenStore, SessionStore};
use secrecy::SecretString;

use crate::fixtures;
use crate::mock_backend::MockBackend;

/// One client process worth of components.
pub struct ClientStack {
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
    pub auth: AuthManager,
    pub notifications: Arc<NotificationCache>,
}

impl ClientStack {
    pub fn new(config: &ApiConfig, store: Arc<dyn TokenStore>) -> Result<Self, MedrentError> {
        let session = Arc::new(SessionStore::new(store));
        let api = ApiClient::new(config, session.clone())?;
        Ok(Self {
            auth: AuthManager::new(api.clone()),
            notifications: Arc::new(NotificationCache::new(api.notifications())),
            session,
            api,
        })
    }

    /// Logs in `user` with the fixture password.
    pub async fn login(&self, user: &UserIdentity) -> Result<UserIdentity, MedrentError> {
        self.auth
            .login(
                &user.email,
                &SecretString::from(fixtures::TEST_PASSWORD.to_string()),
            )
            .await
    }
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    persistent: bool,
    timeout_secs: u64,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            persistent: true,
            timeout_secs: 5,
        }
    }

    /// Keep tokens in memory instead of a session file.
    pub fn in_memory(mut self) -> Self {
        self.persistent = false;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub async fn build(self) -> Result<TestHarness, MedrentError> {
        let dir = tempfile::TempDir::new().map_err(|e| MedrentError::Storage {
            source: Box::new(e),
        })?;
        let session_file = dir.path().join("session.json");
        let backend = MockBackend::start().await;
        let config = ApiConfig {
            timeout_secs: self.timeout_secs,
            ..backend.api_config()
        };

        let store: Arc<dyn TokenStore> = if self.persistent {
            Arc::new(FileTokenStore::new(&session_file))
        } else {
            Arc::new(MemoryTokenStore::new())
        };
        let stack = ClientStack::new(&config, store)?;

        Ok(TestHarness {
            backend,
            stack,
            config,
            session_file,
            _dir: dir,
        })
    }
}

pub struct TestHarness {
    pub backend: MockBackend,
    pub stack: ClientStack,
    config: ApiConfig,
    session_file: PathBuf,
    _dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn session_file(&self) -> &Path {
        &self.session_file
    }

    /// A fresh stack over the same session file, as after a process restart.
    pub fn reopen(&self) -> Result<ClientStack, MedrentError> {
        ClientStack::new(
            &self.config,
            Arc::new(FileTokenStore::new(&self.session_file)),
        )
    }
}
