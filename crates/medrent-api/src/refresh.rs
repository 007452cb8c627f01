// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! 401 handling: one transparent token renewal and one replay.
//!
//! When an authenticated request comes back 401, the access token it carried
//! is compared against the session under the refresh gate:
//!
//! - the session already holds a different token: another request renewed
//!   it while this one was in flight, so replay with the current token;
//! - the session is gone: a concurrent renewal failed (or the user logged
//!   out), so fail without calling the backend again;
//! - otherwise this request performs the renewal while holding the gate.
//!
//! A replayed request is marked as retried and its response, whatever the
//! status, is final.

use medrent_core::MedrentError;
use medrent_session::ClearReason;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::client::{ApiClient, ApiRequest, ApiResponse};
use crate::wire::{RefreshRequest, RefreshResponse, TOKEN_REFRESH_PATH, is_token_endpoint};

impl ApiClient {
    pub(crate) async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, MedrentError> {
        let sent_with = if request.authenticated {
            self.inner.session.credentials().map(|t| t.access)
        } else {
            None
        };

        let response = self.attempt(&request, sent_with.as_ref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED || !renewable(&request) {
            return self.finish(&request, response);
        }

        debug!(path = %request.path, "request unauthorized, renewing access token");
        let Some(fresh) = self.renew_after_unauthorized(sent_with.as_ref()).await? else {
            return self.finish(&request, response);
        };

        let mut replay = request;
        replay.retried = true;
        let response = self.attempt(&replay, Some(&fresh)).await?;
        self.finish(&replay, response)
    }

    /// Returns the access token to replay with, renewing it if nobody else
    /// has. Failure clears the session. `None` means there was no refresh
    /// token to renew with; the 401 itself is then the result.
    async fn renew_after_unauthorized(
        &self,
        stale: Option<&SecretString>,
    ) -> Result<Option<SecretString>, MedrentError> {
        let _flight = self.inner.refresh_gate.lock().await;
        let session = &self.inner.session;

        let current = match (session.credentials(), stale) {
            (Some(tokens), Some(stale)) if tokens.access.expose_secret() != stale.expose_secret() => {
                debug!("access token already renewed by a concurrent request");
                return Ok(Some(tokens.access));
            }
            (Some(tokens), None) => {
                // Sent before the session existed; try once with its token.
                return Ok(Some(tokens.access));
            }
            (None, Some(_)) => {
                return Err(MedrentError::AuthExpired(
                    "session ended while the request was in flight".into(),
                ));
            }
            (Some(tokens), Some(_)) => Some(tokens),
            (None, None) => None,
        };

        let Some(refresh) = current.and_then(|t| t.refresh) else {
            warn!("request unauthorized and no refresh token is stored");
            // The broadcast is what matters here; a backend error was logged.
            let _ = session
                .clear(ClearReason::AuthFailure("no refresh token".into()))
                .await;
            return Ok(None);
        };

        match self.request_refresh(&refresh).await {
            Ok(renewed) => {
                let access = SecretString::from(renewed.access.clone());
                session.replace_access(renewed.access, renewed.refresh).await?;
                info!("access token renewed");
                Ok(Some(access))
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed, clearing session");
                let _ = session
                    .clear(ClearReason::AuthFailure(e.to_string()))
                    .await;
                Err(e)
            }
        }
    }

    /// Calls the refresh endpoint directly, outside the 401 handling.
    async fn request_refresh(
        &self,
        refresh: &SecretString,
    ) -> Result<RefreshResponse, MedrentError> {
        let request = ApiRequest::post(TOKEN_REFRESH_PATH)
            .anonymous()
            .json(&RefreshRequest {
                refresh: refresh.expose_secret(),
            })?;
        let response = self.attempt(&request, None).await?;

        match response.status() {
            status if status.is_success() => response.json(),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                let rejected = self
                    .finish(&request, response)
                    .err()
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                Err(MedrentError::AuthExpired(format!(
                    "refresh token rejected ({rejected})"
                )))
            }
            _ => match self.finish(&request, response) {
                Err(e) => Err(e),
                Ok(_) => Err(MedrentError::Internal(
                    "refresh endpoint returned an unexpected status".into(),
                )),
            },
        }
    }
}

fn renewable(request: &ApiRequest) -> bool {
    request.authenticated && !request.retried && !is_token_endpoint(&request.path)
}
