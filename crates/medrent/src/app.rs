// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The client components for one CLI invocation, built once from config.

use std::sync::Arc;

use medrent_api::{ApiClient, SecretRegistry};
use medrent_auth::AuthManager;
use medrent_config::MedrentConfig;
use medrent_core::{MedrentError, UserIdentity};
use medrent_notify::NotificationCache;
use medrent_session::SessionStore;
use tracing::debug;

pub struct App {
    pub config: MedrentConfig,
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
    pub auth: AuthManager,
    pub notifications: Arc<NotificationCache>,
}

impl App {
    /// Wires the session store, API client, auth manager and notification
    /// cache. `secrets` is shared with the log writer.
    pub fn new(config: MedrentConfig, secrets: SecretRegistry) -> Result<Self, MedrentError> {
        let store = medrent_session::open_token_store(&config.session);
        let session = Arc::new(SessionStore::new(store));
        let api = ApiClient::with_secrets(&config.api, session.clone(), secrets)?;
        debug!(base_url = api.base_url(), "client stack ready");
        Ok(Self {
            auth: AuthManager::new(api.clone()),
            notifications: Arc::new(NotificationCache::new(api.notifications())),
            session,
            api,
            config,
        })
    }

    /// Restores the persisted session, if any, and returns its user.
    pub async fn restore(&self) -> Option<UserIdentity> {
        self.auth.check_session().await
    }

    /// The logged-in user, or `Unauthorized` when there is none.
    pub fn require_user(&self) -> Result<UserIdentity, MedrentError> {
        self.auth
            .current_user()
            .ok_or_else(|| MedrentError::Unauthorized("not logged in".into()))
    }
}
