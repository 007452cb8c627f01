// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background refresh of the notification cache.
//!
//! While a user is logged in the cache is refreshed on a fixed interval and
//! right after login. When the session ends the cache is emptied. The loop
//! stops when its [`CancellationToken`] fires or the session store goes away.

use std::sync::Arc;
use std::time::Duration;

use medrent_config::model::NotificationsConfig;
use medrent_core::SessionEvent;
use medrent_session::SessionStore;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::NotificationCache;

pub struct NotificationPoller {
    cache: Arc<NotificationCache>,
    session: Arc<SessionStore>,
    interval: Duration,
}

impl NotificationPoller {
    pub fn new(cache: Arc<NotificationCache>, session: Arc<SessionStore>, interval: Duration) -> Self {
        Self {
            cache,
            session,
            interval,
        }
    }

    pub fn from_config(
        config: &NotificationsConfig,
        cache: Arc<NotificationCache>,
        session: Arc<SessionStore>,
    ) -> Self {
        Self::new(cache, session, Duration::from_secs(config.poll_interval_secs))
    }

    /// Runs the loop on a new task.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    pub async fn run(self, cancel: CancellationToken) {
        let mut events = self.session.subscribe();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = self.interval.as_secs(), "notification poller started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("notification poller shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if self.session.is_authenticated() {
                        self.refresh().await;
                    }
                }
                event = events.recv() => match event {
                    Ok(SessionEvent::LoggedIn(_)) => {
                        self.refresh().await;
                        ticker.reset();
                    }
                    Ok(SessionEvent::LoggedOut | SessionEvent::LoginRequired { .. }) => {
                        debug!("session ended, clearing notifications");
                        self.cache.clear();
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "poller lagged behind session events");
                        if !self.session.is_authenticated() {
                            self.cache.clear();
                        }
                    }
                    Err(RecvError::Closed) => {
                        debug!("session store dropped, stopping poller");
                        break;
                    }
                },
            }
        }
    }

    async fn refresh(&self) {
        if let Err(e) = self.cache.fetch_all().await {
            warn!(error = %e, "notification refresh failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use medrent_api::ApiClient;
    use medrent_config::model::ApiConfig;
    use medrent_core::{Role, TokenPair, UserIdentity};
    use medrent_session::{ClearReason, MemoryTokenStore};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn user() -> UserIdentity {
        UserIdentity {
            id: 1,
            email: "a@example.org".into(),
            first_name: String::new(),
            last_name: String::new(),
            role: Role::Client,
            phone_number: None,
            address: None,
        }
    }

    async fn setup(server: &MockServer) -> (Arc<NotificationCache>, Arc<SessionStore>) {
        Mock::given(method("GET"))
            .and(path("/notifications/notifications/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 1,
                "message": "Invoice overdue",
                "is_read": false,
                "created_at": "2026-02-01T10:00:00Z"
            }])))
            .mount(server)
            .await;
        let session = Arc::new(SessionStore::new(Arc::new(MemoryTokenStore::new())));
        let config = ApiConfig {
            base_url: server.uri(),
            timeout_secs: 5,
            ..ApiConfig::default()
        };
        let api = ApiClient::new(&config, session.clone()).unwrap();
        (Arc::new(NotificationCache::new(api.notifications())), session)
    }

    async fn wait_until(mut cond: impl FnMut() -> bool) {
        for _ in 0..100 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("condition not reached");
    }

    #[tokio::test]
    async fn login_fetches_and_logout_clears() {
        let server = MockServer::start().await;
        let (cache, session) = setup(&server).await;
        let cancel = CancellationToken::new();
        let handle = NotificationPoller::new(cache.clone(), session.clone(), Duration::from_secs(3600))
            .spawn(cancel.clone());

        // Let the poller subscribe before the session changes.
        tokio::time::sleep(Duration::from_millis(50)).await;
        session.establish(TokenPair::new("acc", None), user()).await.unwrap();
        wait_until(|| cache.unread_count() == 1).await;

        session.clear(ClearReason::Logout).await.unwrap();
        wait_until(|| cache.is_empty()).await;

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn ticks_do_nothing_without_session() {
        let server = MockServer::start().await;
        let (cache, session) = setup(&server).await;
        let cancel = CancellationToken::new();
        let handle = NotificationPoller::new(cache.clone(), session, Duration::from_millis(20))
            .spawn(cancel.clone());

        tokio::time::sleep(Duration::from_millis(120)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert!(cache.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn interval_refreshes_while_authenticated() {
        let server = MockServer::start().await;
        let (cache, session) = setup(&server).await;
        session.establish(TokenPair::new("acc", None), user()).await.unwrap();

        let cancel = CancellationToken::new();
        let handle = NotificationPoller::new(cache.clone(), session, Duration::from_millis(30))
            .spawn(cancel.clone());
        wait_until(|| cache.len() == 1).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert!(server.received_requests().await.unwrap().len() >= 2);
    }
}
