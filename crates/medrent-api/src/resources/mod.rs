// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST resource services.
//!
//! Every backend collection is a DRF router endpoint with the same shape:
//! `GET/POST {collection}`, `GET/PUT/PATCH/DELETE {collection}{id}/`, plus
//! named actions under `{collection}{id}/{action}/` or
//! `{collection}{action}/`. [`ResourceClient`] covers that shape once; the
//! per-domain services name their collections and actions.
//!
//! Payloads are passed through as `serde_json::Value` or any caller-chosen
//! `Deserialize` type.

pub mod clients;
pub mod instruments;
pub mod notifications;
pub mod orders;
pub mod reports;
pub mod staff;

use medrent_core::MedrentError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{ApiClient, ApiRequest};

pub use clients::ClientService;
pub use instruments::InstrumentService;
pub use notifications::NotificationService;
pub use orders::OrderService;
pub use reports::ReportService;
pub use staff::StaffService;

/// Query parameters for list endpoints (filters, search, ordering, page).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    params: Vec<(String, String)>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an arbitrary filter, e.g. `("status", "pending")`.
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn search(self, term: impl ToString) -> Self {
        self.param("search", term)
    }

    /// DRF ordering, e.g. `-created_at`.
    pub fn ordering(self, field: impl ToString) -> Self {
        self.param("ordering", field)
    }

    pub fn page(self, page: u32) -> Self {
        self.param("page", page)
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parses `key=value` pairs as given on a command line.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = &'a str>) -> Result<Self, MedrentError> {
        pairs.into_iter().try_fold(Self::new(), |query, pair| {
            match pair.split_once('=') {
                Some((key, value)) if !key.is_empty() => Ok(query.param(key, value)),
                _ => Err(MedrentError::validation(format!(
                    "expected key=value filter, got `{pair}`"
                ))),
            }
        })
    }
}

/// List responses arrive either paginated or as a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListEnvelope<T> {
    Paged { results: Vec<T> },
    Plain(Vec<T>),
}

impl<T> ListEnvelope<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            ListEnvelope::Paged { results } => results,
            ListEnvelope::Plain(items) => items,
        }
    }
}

/// CRUD and action calls against one backend collection.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    api: ApiClient,
    collection: String,
}

impl ResourceClient {
    /// `collection` is the list path with trailing slash, e.g.
    /// `/instruments/instruments/`.
    pub fn new(api: ApiClient, collection: impl Into<String>) -> Self {
        Self {
            api,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn item_path(&self, id: u64) -> String {
        format!("{}{id}/", self.collection)
    }

    pub async fn list<T: DeserializeOwned>(&self, query: &ListQuery) -> Result<Vec<T>, MedrentError> {
        let request = ApiRequest::get(&self.collection).queries(query.params.iter().cloned());
        let envelope: ListEnvelope<T> = self.api.send_json(request).await?;
        Ok(envelope.into_items())
    }

    pub async fn retrieve<T: DeserializeOwned>(&self, id: u64) -> Result<T, MedrentError> {
        self.api.send_json(ApiRequest::get(self.item_path(id))).await
    }

    pub async fn create<T, B>(&self, body: &B) -> Result<T, MedrentError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.api
            .send_json(ApiRequest::post(&self.collection).json(body)?)
            .await
    }

    /// Full replacement (`PUT`).
    pub async fn update<T, B>(&self, id: u64, body: &B) -> Result<T, MedrentError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.api
            .send_json(ApiRequest::put(self.item_path(id)).json(body)?)
            .await
    }

    /// Partial update (`PATCH`).
    pub async fn partial_update<T, B>(&self, id: u64, body: &B) -> Result<T, MedrentError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.api
            .send_json(ApiRequest::patch(self.item_path(id)).json(body)?)
            .await
    }

    pub async fn delete(&self, id: u64) -> Result<(), MedrentError> {
        self.api.send_unit(ApiRequest::delete(self.item_path(id))).await
    }

    /// `POST {collection}{id}/{action}/`.
    pub async fn detail_action(
        &self,
        id: u64,
        action: &str,
        body: Option<Value>,
    ) -> Result<Value, MedrentError> {
        let mut request = ApiRequest::post(format!("{}{action}/", self.item_path(id)));
        if let Some(body) = body {
            request = request.body(body);
        }
        self.api.send(request).await?.json_value()
    }

    /// `POST {collection}{action}/`.
    pub async fn collection_action(
        &self,
        action: &str,
        body: Option<Value>,
    ) -> Result<Value, MedrentError> {
        let mut request = ApiRequest::post(format!("{}{action}/", self.collection));
        if let Some(body) = body {
            request = request.body(body);
        }
        self.api.send(request).await?.json_value()
    }

    /// `GET {collection}{id}/{route}/`.
    pub async fn detail_get(
        &self,
        id: u64,
        route: &str,
        query: &ListQuery,
    ) -> Result<Value, MedrentError> {
        let request = ApiRequest::get(format!("{}{route}/", self.item_path(id)))
            .queries(query.params.iter().cloned());
        self.api.send(request).await?.json_value()
    }

    /// `GET {collection}{route}/`.
    pub async fn collection_get(&self, route: &str) -> Result<Value, MedrentError> {
        let request = ApiRequest::get(format!("{}{route}/", self.collection));
        self.api.send(request).await?.json_value()
    }

    /// Raw body of `GET {collection}{id}/{route}/`, for file downloads.
    pub async fn detail_bytes(&self, id: u64, route: &str) -> Result<Vec<u8>, MedrentError> {
        let request = ApiRequest::get(format!("{}{route}/", self.item_path(id)));
        Ok(self.api.send(request).await?.into_bytes())
    }

    /// List filtered by a single foreign key, e.g. `?order=12`.
    pub async fn list_for(&self, key: &str, id: u64) -> Result<Vec<Value>, MedrentError> {
        self.list(&ListQuery::new().param(key, id)).await
    }
}

impl ApiClient {
    pub fn instruments(&self) -> InstrumentService {
        InstrumentService::new(self.clone())
    }

    pub fn clients(&self) -> ClientService {
        ClientService::new(self.clone())
    }

    pub fn staff(&self) -> StaffService {
        StaffService::new(self.clone())
    }

    pub fn orders(&self) -> OrderService {
        OrderService::new(self.clone())
    }

    pub fn reports(&self) -> ReportService {
        ReportService::new(self.clone())
    }

    pub fn notifications(&self) -> NotificationService {
        NotificationService::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_envelope_accepts_both_shapes() {
        let paged: ListEnvelope<u32> =
            serde_json::from_str(r#"{"count": 2, "next": null, "results": [1, 2]}"#).unwrap();
        assert_eq!(paged.into_items(), vec![1, 2]);

        let plain: ListEnvelope<u32> = serde_json::from_str("[3]").unwrap();
        assert_eq!(plain.into_items(), vec![3]);
    }

    #[test]
    fn query_from_pairs() {
        let query = ListQuery::from_pairs(["status=pending", "search=x=y"]).unwrap();
        assert_eq!(
            query.params(),
            &[
                ("status".to_string(), "pending".to_string()),
                ("search".to_string(), "x=y".to_string())
            ]
        );
        assert!(ListQuery::from_pairs(["oops"]).is_err());
        assert!(ListQuery::from_pairs(["=v"]).is_err());
    }

    #[test]
    fn query_builders() {
        let query = ListQuery::new().search("ventilator").ordering("-created_at").page(2);
        assert_eq!(query.params().len(), 3);
        assert_eq!(query.params()[2], ("page".to_string(), "2".to_string()));
    }
}
