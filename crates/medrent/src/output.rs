// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal rendering for command results.
//!
//! `--json` prints machine-readable JSON on stdout. Otherwise results are
//! printed as short human-readable lines, colored unless `--plain` is
//! passed or stdout is not a TTY. Errors always go to stderr.

use std::io::IsTerminal;

use colored::Colorize;
use medrent_core::{MedrentError, UserIdentity};
use medrent_notify::{NotificationEntry, SyncState};
use serde::Serialize;
use serde_json::{Value, json};

/// Fields tried, in order, when picking a one-line label for a record.
const LABEL_FIELDS: &[&str] = &[
    "name",
    "title",
    "order_number",
    "invoice_number",
    "serial_number",
    "email",
    "message",
];

#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
    color: bool,
}

impl Output {
    pub fn new(json: bool, plain: bool) -> Self {
        Self {
            json,
            color: !json && !plain && std::io::stdout().is_terminal(),
        }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Prints a list of backend records.
    pub fn records(&self, records: &[Value]) {
        if self.json {
            print_json(&records);
            return;
        }
        if records.is_empty() {
            println!("(no records)");
            return;
        }
        for record in records {
            println!("{}", self.record_line(record));
        }
    }

    /// Prints a single backend record.
    pub fn record(&self, record: &Value) {
        if self.json {
            print_json(record);
            return;
        }
        match record {
            Value::Object(map) => {
                for (key, value) in map {
                    let key = if self.color {
                        key.bold().to_string()
                    } else {
                        key.clone()
                    };
                    println!("  {key}: {}", scalar(value));
                }
            }
            Value::Null => println!("(empty response)"),
            other => println!("{}", scalar(other)),
        }
    }

    pub fn user(&self, user: &UserIdentity) {
        if self.json {
            print_json(user);
            return;
        }
        for line in user_lines(user) {
            println!("  {line}");
        }
    }

    pub fn notifications(&self, entries: &[NotificationEntry], unread: usize) {
        if self.json {
            print_json(&json!({
                "unread": unread,
                "notifications": entries.iter().map(|e| &e.notification).collect::<Vec<_>>(),
            }));
            return;
        }
        if entries.is_empty() {
            println!("No notifications.");
            return;
        }
        for entry in entries {
            let line = notification_line(entry);
            if self.color && !entry.notification.is_read {
                println!("{}", line.bold());
            } else {
                println!("{line}");
            }
        }
        println!();
        println!("{unread} unread");
    }

    /// Confirms a completed action.
    pub fn done(&self, message: &str) {
        if self.json {
            print_json(&json!({ "status": "ok", "message": message }));
        } else if self.color {
            println!("{} {message}", "✓".green());
        } else {
            println!("[OK] {message}");
        }
    }

    pub fn error(&self, err: &MedrentError) {
        if self.json {
            eprintln!("{}", error_json(err));
            return;
        }
        if self.color {
            eprintln!("{} {err}", "error:".red().bold());
        } else {
            eprintln!("error: {err}");
        }
        for line in field_lines(err) {
            eprintln!("  {line}");
        }
        if err.is_auth_failure() {
            eprintln!("  Log in again with: medrent login <email>");
        }
    }

    fn record_line(&self, record: &Value) -> String {
        let id = record
            .get("id")
            .map(scalar)
            .unwrap_or_else(|| "-".to_string());
        let id = format!("#{id}");
        let id = if self.color {
            id.cyan().to_string()
        } else {
            id
        };
        format!("{id:>8}  {}", label(record))
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    );
}

/// A short label for a record, falling back to its compact JSON.
pub(crate) fn label(record: &Value) -> String {
    LABEL_FIELDS
        .iter()
        .find_map(|field| record.get(*field).filter(|v| !v.is_null()).map(scalar))
        .unwrap_or_else(|| record.to_string())
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

pub(crate) fn user_lines(user: &UserIdentity) -> Vec<String> {
    let mut lines = vec![
        format!("Name:    {}", user.display_name()),
        format!("Email:   {}", user.email),
        format!("Role:    {}", user.role),
    ];
    if let Some(phone) = &user.phone_number {
        lines.push(format!("Phone:   {phone}"));
    }
    if let Some(address) = &user.address {
        lines.push(format!("Address: {address}"));
    }
    lines
}

pub(crate) fn notification_line(entry: &NotificationEntry) -> String {
    let n = &entry.notification;
    let marker = match (n.is_read, entry.sync) {
        (_, SyncState::Unconfirmed) => "!",
        (_, SyncState::Pending) => "~",
        (false, _) => "*",
        (true, _) => " ",
    };
    let text = if n.title.is_empty() {
        n.message.clone()
    } else {
        format!("{}: {}", n.title, n.message)
    };
    format!(
        "{marker} {:>5}  {}  [{}] {text}",
        n.id,
        n.created_at.format("%Y-%m-%d %H:%M"),
        n.priority
    )
}

fn field_lines(err: &MedrentError) -> Vec<String> {
    match err {
        MedrentError::Validation { fields, .. } if fields.len() > 1 => fields
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
            .collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn error_json(err: &MedrentError) -> Value {
    let mut body = json!({ "error": err.to_string() });
    if let MedrentError::Validation { fields, .. } = err
        && !fields.is_empty()
    {
        body["fields"] = json!(fields);
    }
    if let MedrentError::PartialFailure { failed, .. } = err {
        body["failed"] = json!(failed);
    }
    body
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use medrent_core::{Notification, Role};

    use super::*;

    fn notification(is_read: bool) -> Notification {
        Notification {
            id: 12,
            title: "Invoice".into(),
            message: "INV-7 is overdue".into(),
            notification_type: "payment".into(),
            priority: "high".into(),
            is_read,
            read_at: None,
            related_object_type: None,
            related_object_id: None,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn label_prefers_name_then_falls_back() {
        assert_eq!(label(&json!({"id": 1, "name": "Ventilator"})), "Ventilator");
        assert_eq!(
            label(&json!({"id": 2, "name": null, "order_number": "ORD-2"})),
            "ORD-2"
        );
        assert_eq!(label(&json!({"id": 3})), r#"{"id":3}"#);
    }

    #[test]
    fn plain_record_line_has_id_and_label() {
        let out = Output {
            json: false,
            color: false,
        };
        let line = out.record_line(&json!({"id": 42, "title": "Q1 revenue"}));
        assert_eq!(line, "     #42  Q1 revenue");
    }

    #[test]
    fn user_lines_skip_missing_contact_fields() {
        let user = UserIdentity {
            id: 1,
            email: "ada@example.org".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            role: Role::Staff,
            phone_number: None,
            address: None,
        };
        let lines = user_lines(&user);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Ada Lovelace"));
        assert!(lines[2].contains("staff"));
    }

    #[test]
    fn notification_line_marks_state() {
        let unread = NotificationEntry {
            notification: notification(false),
            sync: SyncState::Confirmed,
        };
        let line = notification_line(&unread);
        assert!(line.starts_with('*'));
        assert!(line.contains("2026-03-01 09:30"));
        assert!(line.contains("Invoice: INV-7 is overdue"));

        let unconfirmed = NotificationEntry {
            notification: notification(true),
            sync: SyncState::Unconfirmed,
        };
        assert!(notification_line(&unconfirmed).starts_with('!'));
    }

    #[test]
    fn error_json_carries_fields_and_failed_ids() {
        let err = MedrentError::field("email", "Enter a valid email address.");
        assert_eq!(error_json(&err)["fields"]["email"][0], "Enter a valid email address.");

        let err = MedrentError::PartialFailure {
            failed: vec![3, 5],
            source: Box::new(MedrentError::Cancelled),
        };
        assert_eq!(error_json(&err)["failed"], json!([3, 5]));
    }
}
