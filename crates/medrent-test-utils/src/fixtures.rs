// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned identities, notifications, and backend payloads.

use chrono::{Duration, TimeZone, Utc};
use medrent_core::{Notification, Role, UserIdentity};
use serde_json::{Value, json};

pub const TEST_PASSWORD: &str = "correct horse battery staple";

pub fn user(id: u64, role: Role) -> UserIdentity {
    let (first, last) = match role {
        Role::Admin => ("Grace", "Hopper"),
        Role::Staff => ("Ada", "Lovelace"),
        Role::Client => ("Florence", "Nightingale"),
    };
    UserIdentity {
        id,
        email: format!("{}@example.org", first.to_lowercase()),
        first_name: first.into(),
        last_name: last.into(),
        role,
        phone_number: None,
        address: None,
    }
}

pub fn admin() -> UserIdentity {
    user(1, Role::Admin)
}

pub fn staff() -> UserIdentity {
    user(2, Role::Staff)
}

/// A notification created `minutes` after a fixed epoch.
pub fn notification(id: u64, is_read: bool, minutes: i64) -> Notification {
    let base = Utc
        .with_ymd_and_hms(2026, 1, 1, 8, 0, 0)
        .single()
        .unwrap_or_default();
    Notification {
        id,
        title: format!("Notification {id}"),
        message: format!("Message body {id}"),
        notification_type: "order".into(),
        priority: "medium".into(),
        is_read,
        read_at: None,
        related_object_type: Some("order".into()),
        related_object_id: Some(id),
        created_at: base + Duration::minutes(minutes),
    }
}

/// JSON body of a successful login or registration.
pub fn token_body(access: &str, refresh: &str, user: &UserIdentity) -> Value {
    json!({
        "access": access,
        "refresh": refresh,
        "user": user,
    })
}

pub fn notifications_body(list: &[Notification]) -> Value {
    serde_json::to_value(list).unwrap_or(Value::Null)
}
