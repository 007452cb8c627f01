// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rental/sale orders, their items, payments, and invoices.

use medrent_core::MedrentError;
use serde_json::Value;

use super::ResourceClient;
use crate::client::ApiClient;

#[derive(Debug, Clone)]
pub struct OrderService {
    api: ApiClient,
}

impl OrderService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn orders(&self) -> ResourceClient {
        ResourceClient::new(self.api.clone(), "/orders/orders/")
    }

    pub fn items(&self) -> ResourceClient {
        ResourceClient::new(self.api.clone(), "/orders/items/")
    }

    pub fn payments(&self) -> ResourceClient {
        ResourceClient::new(self.api.clone(), "/orders/payments/")
    }

    pub fn invoices(&self) -> ResourceClient {
        ResourceClient::new(self.api.clone(), "/orders/invoices/")
    }

    pub async fn cancel(&self, order_id: u64) -> Result<Value, MedrentError> {
        self.orders().detail_action(order_id, "cancel", None).await
    }

    pub async fn generate_invoice(&self, order_id: u64) -> Result<Value, MedrentError> {
        self.orders()
            .detail_action(order_id, "generate_invoice", None)
            .await
    }

    pub async fn items_for(&self, order_id: u64) -> Result<Vec<Value>, MedrentError> {
        self.items().list_for("order", order_id).await
    }

    pub async fn send_invoice(&self, invoice_id: u64) -> Result<Value, MedrentError> {
        self.invoices().detail_action(invoice_id, "send", None).await
    }

    pub async fn mark_invoice_paid(&self, invoice_id: u64) -> Result<Value, MedrentError> {
        self.invoices()
            .detail_action(invoice_id, "mark_paid", None)
            .await
    }
}
