// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reports, dashboards, and dashboard widgets.

use medrent_core::MedrentError;
use serde_json::Value;

use super::{ListQuery, ResourceClient};
use crate::client::ApiClient;

#[derive(Debug, Clone)]
pub struct ReportService {
    api: ApiClient,
}

impl ReportService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn reports(&self) -> ResourceClient {
        ResourceClient::new(self.api.clone(), "/reports/reports/")
    }

    pub fn dashboards(&self) -> ResourceClient {
        ResourceClient::new(self.api.clone(), "/reports/dashboards/")
    }

    pub fn widgets(&self) -> ResourceClient {
        ResourceClient::new(self.api.clone(), "/reports/widgets/")
    }

    /// Asks the backend to build a report from `parameters`.
    pub async fn generate(&self, parameters: Value) -> Result<Value, MedrentError> {
        self.reports()
            .collection_action("generate", Some(parameters))
            .await
    }

    /// The generated report file, as raw bytes.
    pub async fn download(&self, report_id: u64) -> Result<Vec<u8>, MedrentError> {
        self.reports().detail_bytes(report_id, "download").await
    }

    pub async fn default_dashboard(&self) -> Result<Value, MedrentError> {
        self.dashboards().collection_get("default").await
    }

    pub async fn widgets_for(&self, dashboard_id: u64) -> Result<Vec<Value>, MedrentError> {
        self.widgets().list_for("dashboard", dashboard_id).await
    }

    /// Chart data of one widget; `query` carries date ranges and filters.
    pub async fn widget_data(&self, widget_id: u64, query: &ListQuery) -> Result<Value, MedrentError> {
        self.widgets().detail_get(widget_id, "data", query).await
    }
}
