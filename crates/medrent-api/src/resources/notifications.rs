// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification endpoints, plus the outbound email and SMS queues.

use medrent_core::{MedrentError, Notification};
use serde_json::Value;

use super::{ListQuery, ResourceClient};
use crate::client::ApiClient;

#[derive(Debug, Clone)]
pub struct NotificationService {
    api: ApiClient,
}

impl NotificationService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn notifications(&self) -> ResourceClient {
        ResourceClient::new(self.api.clone(), "/notifications/notifications/")
    }

    pub fn emails(&self) -> ResourceClient {
        ResourceClient::new(self.api.clone(), "/notifications/emails/")
    }

    pub fn sms(&self) -> ResourceClient {
        ResourceClient::new(self.api.clone(), "/notifications/sms/")
    }

    /// The current user's notifications.
    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Notification>, MedrentError> {
        self.notifications().list(query).await
    }

    pub async fn mark_as_read(&self, id: u64) -> Result<(), MedrentError> {
        self.notifications()
            .detail_action(id, "mark_as_read", None)
            .await
            .map(|_| ())
    }

    pub async fn mark_all_as_read(&self) -> Result<(), MedrentError> {
        self.notifications()
            .collection_action("mark_all_as_read", None)
            .await
            .map(|_| ())
    }

    pub async fn send_email(&self, email_id: u64) -> Result<Value, MedrentError> {
        self.emails().detail_action(email_id, "send", None).await
    }

    pub async fn send_sms(&self, sms_id: u64) -> Result<Value, MedrentError> {
        self.sms().detail_action(sms_id, "send", None).await
    }
}
