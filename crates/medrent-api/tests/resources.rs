// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resource service routes against a mock backend.

use std::sync::Arc;

use medrent_api::{ApiClient, ListQuery};
use medrent_config::model::ApiConfig;
use medrent_core::{MedrentError, Role, TokenPair, UserIdentity};
use medrent_session::{MemoryTokenStore, SessionStore};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client(server: &MockServer) -> ApiClient {
    let session = Arc::new(SessionStore::new(Arc::new(MemoryTokenStore::new())));
    session
        .establish(
            TokenPair::new("acc", Some("ref".into())),
            UserIdentity {
                id: 1,
                email: "admin@example.org".into(),
                first_name: "Ada".into(),
                last_name: "Admin".into(),
                role: Role::Admin,
                phone_number: None,
                address: None,
            },
        )
        .await
        .unwrap();
    let config = ApiConfig {
        base_url: server.uri(),
        ..ApiConfig::default()
    };
    ApiClient::new(&config, session).unwrap()
}

#[tokio::test]
async fn instrument_crud_round() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instruments/instruments/"))
        .and(query_param("search", "ventilator"))
        .and(header("authorization", "Bearer acc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1, "next": null, "previous": null,
            "results": [{"id": 5, "name": "Ventilator"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/instruments/instruments/5/"))
        .and(body_json(json!({"name": "Ventilator II"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 5, "name": "Ventilator II"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/instruments/instruments/5/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let instruments = client(&server).await.instruments().instruments();
    let listed: Vec<Value> = instruments
        .list(&ListQuery::new().search("ventilator"))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    let updated: Value = instruments
        .update(5, &json!({"name": "Ventilator II"}))
        .await
        .unwrap();
    assert_eq!(updated["name"], "Ventilator II");

    instruments.delete(5).await.unwrap();
}

#[tokio::test]
async fn maintenance_is_filtered_by_instrument() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instruments/maintenance/"))
        .and(query_param("instrument", "9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])))
        .expect(1)
        .mount(&server)
        .await;

    let records = client(&server)
        .await
        .instruments()
        .maintenance_for(9)
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn leave_rejection_sends_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/staff/leaves/3/reject/"))
        .and(body_json(json!({"rejection_reason": "understaffed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "rejected"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/staff/attendance/check_in/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 11})))
        .expect(1)
        .mount(&server)
        .await;

    let staff = client(&server).await.staff();
    let rejected = staff.reject_leave(3, "understaffed").await.unwrap();
    assert_eq!(rejected["status"], "rejected");
    assert_eq!(staff.check_in().await.unwrap()["id"], 11);
}

#[tokio::test]
async fn order_actions_hit_detail_routes() {
    let server = MockServer::start().await;
    for route in ["/orders/orders/4/cancel/", "/orders/orders/4/generate_invoice/", "/orders/invoices/8/mark_paid/"] {
        Mock::given(method("POST"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;
    }

    let orders = client(&server).await.orders();
    orders.cancel(4).await.unwrap();
    orders.generate_invoice(4).await.unwrap();
    orders.mark_invoice_paid(8).await.unwrap();
}

#[tokio::test]
async fn report_download_returns_raw_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reports/reports/2/download/"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7 fake".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reports/dashboards/default/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "widgets": []})))
        .mount(&server)
        .await;

    let reports = client(&server).await.reports();
    assert_eq!(reports.download(2).await.unwrap(), b"%PDF-1.7 fake");
    assert_eq!(reports.default_dashboard().await.unwrap()["id"], 1);
}

#[tokio::test]
async fn validation_errors_carry_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/clients/clients/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"name": ["This field is required."]})))
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .clients()
        .clients()
        .create::<Value, _>(&json!({}))
        .await
        .unwrap_err();
    match err {
        MedrentError::Validation { fields, .. } => {
            assert_eq!(fields["name"], vec!["This field is required.".to_string()]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn forbidden_maps_to_permission_denied() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/staff/members/2/"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "detail": "You do not have permission to perform this action."
        })))
        .mount(&server)
        .await;

    let err = client(&server).await.staff().members().delete(2).await.unwrap_err();
    assert!(matches!(err, MedrentError::PermissionDenied(_)));
}

#[tokio::test]
async fn notifications_list_is_typed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notifications/notifications/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1,
            "title": "Order shipped",
            "message": "Order #4 left the warehouse",
            "notification_type": "order",
            "priority": "high",
            "is_read": false,
            "created_at": "2026-01-02T03:04:05Z"
        }])))
        .mount(&server)
        .await;

    let list = client(&server)
        .await
        .notifications()
        .list(&ListQuery::new())
        .await
        .unwrap();
    assert_eq!(list[0].priority, "high");
    assert!(!list[0].is_read);
}
