// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Instruments, their categories, and maintenance records.

use medrent_core::MedrentError;
use serde_json::Value;

use super::ResourceClient;
use crate::client::ApiClient;

#[derive(Debug, Clone)]
pub struct InstrumentService {
    api: ApiClient,
}

impl InstrumentService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn instruments(&self) -> ResourceClient {
        ResourceClient::new(self.api.clone(), "/instruments/instruments/")
    }

    pub fn categories(&self) -> ResourceClient {
        ResourceClient::new(self.api.clone(), "/instruments/categories/")
    }

    pub fn maintenance(&self) -> ResourceClient {
        ResourceClient::new(self.api.clone(), "/instruments/maintenance/")
    }

    /// Maintenance history of one instrument.
    pub async fn maintenance_for(&self, instrument_id: u64) -> Result<Vec<Value>, MedrentError> {
        self.maintenance().list_for("instrument", instrument_id).await
    }
}
