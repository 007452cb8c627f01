// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification cache and poller for the Medrent client.

pub mod cache;
pub mod poller;

pub use cache::{NotificationCache, NotificationEntry, SyncState};
pub use poller::NotificationPoller;
