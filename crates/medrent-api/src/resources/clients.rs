// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hospital clients with their contacts and addresses.

use medrent_core::MedrentError;
use serde_json::Value;

use super::ResourceClient;
use crate::client::ApiClient;

#[derive(Debug, Clone)]
pub struct ClientService {
    api: ApiClient,
}

impl ClientService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn clients(&self) -> ResourceClient {
        ResourceClient::new(self.api.clone(), "/clients/clients/")
    }

    pub fn contacts(&self) -> ResourceClient {
        ResourceClient::new(self.api.clone(), "/clients/contacts/")
    }

    pub fn addresses(&self) -> ResourceClient {
        ResourceClient::new(self.api.clone(), "/clients/addresses/")
    }

    pub async fn contacts_for(&self, client_id: u64) -> Result<Vec<Value>, MedrentError> {
        self.contacts().list_for("client", client_id).await
    }

    pub async fn addresses_for(&self, client_id: u64) -> Result<Vec<Value>, MedrentError> {
        self.addresses().list_for("client", client_id).await
    }
}
