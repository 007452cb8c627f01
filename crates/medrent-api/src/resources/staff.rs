// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Staff members, departments, attendance, and leave requests.

use medrent_core::MedrentError;
use serde_json::{Value, json};

use super::ResourceClient;
use crate::client::ApiClient;

#[derive(Debug, Clone)]
pub struct StaffService {
    api: ApiClient,
}

impl StaffService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn members(&self) -> ResourceClient {
        ResourceClient::new(self.api.clone(), "/staff/members/")
    }

    pub fn departments(&self) -> ResourceClient {
        ResourceClient::new(self.api.clone(), "/staff/departments/")
    }

    pub fn attendance(&self) -> ResourceClient {
        ResourceClient::new(self.api.clone(), "/staff/attendance/")
    }

    pub fn leaves(&self) -> ResourceClient {
        ResourceClient::new(self.api.clone(), "/staff/leaves/")
    }

    /// Records the current user's arrival.
    pub async fn check_in(&self) -> Result<Value, MedrentError> {
        self.attendance().collection_action("check_in", None).await
    }

    pub async fn check_out(&self) -> Result<Value, MedrentError> {
        self.attendance().collection_action("check_out", None).await
    }

    pub async fn approve_leave(&self, leave_id: u64) -> Result<Value, MedrentError> {
        self.leaves().detail_action(leave_id, "approve", None).await
    }

    pub async fn reject_leave(&self, leave_id: u64, reason: &str) -> Result<Value, MedrentError> {
        self.leaves()
            .detail_action(leave_id, "reject", Some(json!({ "rejection_reason": reason })))
            .await
    }
}
