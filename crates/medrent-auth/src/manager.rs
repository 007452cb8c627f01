// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session lifecycle orchestration: login, registration, logout, startup
//! restore, and profile changes.

use std::sync::Arc;

use medrent_api::wire::{
    CHANGE_PASSWORD_PATH, LOGOUT_PATH, LoginRequest, ME_PATH, REGISTER_PATH, TOKEN_PATH,
    TokenResponse,
};
use medrent_api::{ApiClient, ApiRequest};
use medrent_core::{MedrentError, SessionEvent, TokenPair, UserIdentity};
use medrent_session::{ClearReason, SessionStore};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::forms::{PasswordChange, ProfileUpdate, RegistrationRequest, validate_email};

/// Drives authentication against the backend and keeps the
/// [`SessionStore`] in step with it.
#[derive(Debug, Clone)]
pub struct AuthManager {
    api: ApiClient,
}

impl AuthManager {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        self.api.session()
    }

    pub fn current_user(&self) -> Option<UserIdentity> {
        self.session().current_user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.session().subscribe()
    }

    /// Exchanges credentials for a session.
    ///
    /// Tokens and identity are installed together; nothing is visible to
    /// subscribers until both are known.
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<UserIdentity, MedrentError> {
        validate_email(email)?;
        if password.expose_secret().is_empty() {
            return Err(MedrentError::field("password", "Password must not be empty."));
        }

        let issued = self.obtain_tokens(email.trim(), password).await?;
        let user = self.install(issued).await?;
        info!(user_id = user.id, role = %user.role, "logged in");
        Ok(user)
    }

    /// Self-service registration; logs the new account in.
    pub async fn register(
        &self,
        request: &RegistrationRequest,
    ) -> Result<UserIdentity, MedrentError> {
        request.validate()?;

        let response = self
            .api
            .send(ApiRequest::post(REGISTER_PATH).anonymous().body(request.to_body()))
            .await?;
        let body = response.json_value()?;

        // Some deployments answer registration with the created user only;
        // the session then comes from a regular token exchange.
        let issued = if body.get("access").is_some() {
            serde_json::from_value::<TokenResponse>(body).map_err(|e| MedrentError::Network {
                message: format!("malformed registration response: {e}"),
                source: Some(Box::new(e)),
            })?
        } else {
            debug!("registration returned no tokens, obtaining them by login");
            self.obtain_tokens(request.email.trim(), &request.password)
                .await?
        };

        let user = self.install(issued).await?;
        info!(user_id = user.id, role = %user.role, "registered and logged in");
        Ok(user)
    }

    /// Creates an account on behalf of someone else. Requires the current
    /// user to be an admin; the current session is left untouched.
    pub async fn provision_user(
        &self,
        request: &RegistrationRequest,
    ) -> Result<UserIdentity, MedrentError> {
        match self.current_user() {
            Some(user) if user.is_admin() => {}
            Some(_) => {
                return Err(MedrentError::PermissionDenied(
                    "only admins can create accounts for other users".into(),
                ));
            }
            None => {
                return Err(MedrentError::Unauthorized(
                    "log in as an admin to create accounts".into(),
                ));
            }
        }
        request.validate()?;

        let body: Value = self
            .api
            .send_json(ApiRequest::post(REGISTER_PATH).body(request.to_body()))
            .await?;
        let created = body.get("user").cloned().unwrap_or(body);
        let created: UserIdentity =
            serde_json::from_value(created).map_err(|e| MedrentError::Network {
                message: format!("malformed account in response: {e}"),
                source: Some(Box::new(e)),
            })?;
        info!(user_id = created.id, role = %created.role, "account provisioned");
        Ok(created)
    }

    /// Ends the session. The backend is told on a best-effort basis; the
    /// local session is cleared whatever it answers.
    pub async fn logout(&self) -> Result<(), MedrentError> {
        if let Some(tokens) = self.session().credentials() {
            let body = match &tokens.refresh {
                Some(refresh) => json!({ "refresh": refresh.expose_secret() }),
                None => json!({}),
            };
            let request = ApiRequest::post(LOGOUT_PATH).body(body);
            if let Err(e) = self.api.send_with_token(request, &tokens.access).await {
                warn!(error = %e, "backend logout failed, clearing local session anyway");
            }
        }
        self.session().clear(ClearReason::Logout).await
    }

    /// Restores a persisted session at startup.
    ///
    /// Returns the verified identity, or `None` when there is nothing to
    /// restore or the stored tokens no longer work. Never fails: every
    /// error ends in a cleared session.
    pub async fn check_session(&self) -> Option<UserIdentity> {
        let session = self.session();
        match session.begin_restore().await {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => {
                warn!(error = %e, "persisted session unreadable, discarding it");
                let _ = session
                    .clear(ClearReason::AuthFailure(format!("session unreadable: {e}")))
                    .await;
                return None;
            }
        }
        if let Some(user) = session.current_user() {
            return Some(user);
        }

        let verified = match self.api.send_json::<UserIdentity>(ApiRequest::get(ME_PATH)).await {
            Ok(user) => session.complete_restore(user.clone()).await.map(|()| user),
            Err(e) => Err(e),
        };
        match verified {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "persisted session rejected");
                // A rejected renewal has already cleared and announced it.
                if session.credentials().is_some() {
                    let _ = session
                        .clear(ClearReason::AuthFailure(format!("session check failed: {e}")))
                        .await;
                }
                None
            }
        }
    }

    /// Updates the logged-in user's profile and replaces the local identity
    /// with what the backend returns.
    pub async fn update_profile(
        &self,
        update: &ProfileUpdate,
    ) -> Result<UserIdentity, MedrentError> {
        let current = self.current_user().ok_or_else(|| {
            MedrentError::Unauthorized("log in to update the profile".into())
        })?;
        let body = update.apply_to(&current)?;

        let updated: UserIdentity = self
            .api
            .send_json(ApiRequest::put(ME_PATH).body(body))
            .await?;
        self.session().replace_user(updated.clone()).await?;
        info!(user_id = updated.id, "profile updated");
        Ok(updated)
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<(), MedrentError> {
        change.validate()?;
        if !self.is_authenticated() {
            return Err(MedrentError::Unauthorized(
                "log in to change the password".into(),
            ));
        }
        self.api
            .send_unit(ApiRequest::post(CHANGE_PASSWORD_PATH).body(change.to_body()))
            .await?;
        info!("password changed");
        Ok(())
    }

    async fn obtain_tokens(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<TokenResponse, MedrentError> {
        let request = ApiRequest::post(TOKEN_PATH).anonymous().json(&LoginRequest {
            email,
            password: password.expose_secret(),
        })?;
        self.api
            .send_json(request)
            .await
            .map_err(credentials_error)
    }

    /// Resolves the identity for freshly issued tokens and installs both.
    async fn install(&self, issued: TokenResponse) -> Result<UserIdentity, MedrentError> {
        let tokens = TokenPair::new(issued.access, issued.refresh);
        let user = match issued.user {
            Some(user) => user,
            None => {
                self.api
                    .send_with_token(ApiRequest::get(ME_PATH), &tokens.access)
                    .await?
                    .json()?
            }
        };
        self.session().establish(tokens, user.clone()).await?;
        Ok(user)
    }
}

/// Credential rejections from the token endpoint.
fn credentials_error(e: MedrentError) -> MedrentError {
    match e {
        MedrentError::Unauthorized(message) => MedrentError::InvalidCredentials(message),
        MedrentError::Validation { message, .. } => MedrentError::InvalidCredentials(message),
        other => other,
    }
}
