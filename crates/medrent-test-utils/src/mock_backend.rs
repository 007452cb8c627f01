// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A wiremock server speaking the backend's account and notification
//! endpoints.

use medrent_config::model::ApiConfig;
use medrent_core::{Notification, UserIdentity};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::fixtures;

pub const TOKEN_PATH: &str = "/accounts/token/";
pub const REFRESH_PATH: &str = "/accounts/token/refresh/";
pub const NOTIFICATIONS_PATH: &str = "/notifications/notifications/";

pub struct MockBackend {
    server: MockServer,
}

impl MockBackend {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Client configuration pointing at this backend.
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.uri(),
            timeout_secs: 5,
            require_tls: false,
            ..ApiConfig::default()
        }
    }

    /// Accepts `email` with [`fixtures::TEST_PASSWORD`] and issues the pair.
    pub async fn mount_login(&self, user: &UserIdentity, access: &str, refresh: &str) {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .and(body_partial_json(json!({
                "email": user.email,
                "password": fixtures::TEST_PASSWORD,
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(fixtures::token_body(access, refresh, user)),
            )
            .mount(&self.server)
            .await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "detail": "No active account found with the given credentials"
            })))
            .mount(&self.server)
            .await;
    }

    /// `GET /accounts/me/` answering `user` for `access`, 401 otherwise.
    pub async fn mount_me(&self, access: &str, user: &UserIdentity) {
        Mock::given(method("GET"))
            .and(path("/accounts/me/"))
            .and(header("authorization", format!("Bearer {access}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(user))
            .mount(&self.server)
            .await;
        self.mount_expired("/accounts/me/").await;
    }

    /// Any other bearer on `route` gets a token-expired 401.
    pub async fn mount_expired(&self, route: &str) {
        Mock::given(path(route))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "detail": "Given token not valid for any token type",
                "code": "token_not_valid"
            })))
            .mount(&self.server)
            .await;
    }

    /// Exchanges `refresh` for `new_access`, at most `times` times.
    pub async fn mount_refresh(&self, refresh: &str, new_access: &str, times: u64) {
        Mock::given(method("POST"))
            .and(path(REFRESH_PATH))
            .and(body_partial_json(json!({ "refresh": refresh })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": new_access })))
            .up_to_n_times(times)
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Every refresh attempt is rejected.
    pub async fn mount_refresh_rejected(&self) {
        Mock::given(method("POST"))
            .and(path(REFRESH_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "detail": "Token is invalid or expired",
                "code": "token_not_valid"
            })))
            .mount(&self.server)
            .await;
    }

    /// Serves `list` to requests carrying `access`.
    pub async fn mount_notifications(&self, access: &str, list: &[Notification]) {
        Mock::given(method("GET"))
            .and(path(NOTIFICATIONS_PATH))
            .and(header("authorization", format!("Bearer {access}").as_str()))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(fixtures::notifications_body(list)),
            )
            .mount(&self.server)
            .await;
    }

    /// Accepts every per-id mark-as-read call.
    pub async fn mount_mark_read(&self) {
        Mock::given(method("POST"))
            .and(path_regex(r"^/notifications/notifications/\d+/mark_as_read/$"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "notification marked as read"})),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mount_logout(&self) {
        Mock::given(method("POST"))
            .and(path("/accounts/logout/"))
            .respond_with(ResponseTemplate::new(205))
            .mount(&self.server)
            .await;
    }

    /// Number of requests received on `route`.
    pub async fn hits(&self, route: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == route)
            .count()
    }
}
