// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local notification list with optimistic read marking.
//!
//! The unread count is never stored: it is counted from the list on every
//! call. Read marks are applied locally first and tracked per entry with a
//! [`SyncState`] until the backend confirms them; the next
//! [`NotificationCache::fetch_all`] replaces everything with server truth.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use medrent_api::ListQuery;
use medrent_api::resources::NotificationService;
use medrent_core::{MedrentError, Notification};
use tracing::{debug, warn};

/// Whether the local copy of an entry matches the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// As last reported by the backend, or confirmed by it.
    Confirmed,
    /// Changed locally; the backend call is in flight.
    Pending,
    /// Changed locally; the backend call failed.
    Unconfirmed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEntry {
    pub notification: Notification,
    pub sync: SyncState,
}

/// The current user's notifications, newest first.
#[derive(Debug)]
pub struct NotificationCache {
    service: NotificationService,
    entries: RwLock<Vec<NotificationEntry>>,
}

impl NotificationCache {
    pub fn new(service: NotificationService) -> Self {
        Self {
            service,
            entries: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<NotificationEntry>> {
        self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<NotificationEntry>> {
        self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replaces the cache with the backend's list. On failure the cache is
    /// left as it was.
    pub async fn fetch_all(&self) -> Result<Vec<Notification>, MedrentError> {
        let mut fetched = self.service.list(&ListQuery::new()).await?;
        sort_newest_first(&mut fetched);

        *self.write() = fetched
            .iter()
            .cloned()
            .map(|notification| NotificationEntry {
                notification,
                sync: SyncState::Confirmed,
            })
            .collect();
        debug!(
            total = fetched.len(),
            unread = self.unread_count(),
            "notifications refreshed"
        );
        Ok(fetched)
    }

    /// Marks one notification read, locally first.
    ///
    /// An unknown id fails with `NotFound` without contacting the backend;
    /// an entry already confirmed as read is left alone. If the backend call
    /// fails the entry stays read but becomes `Unconfirmed`.
    pub async fn mark_read(&self, id: u64) -> Result<(), MedrentError> {
        {
            let mut entries = self.write();
            let entry = entries
                .iter_mut()
                .find(|e| e.notification.id == id)
                .ok_or_else(|| MedrentError::NotFound(format!("notification {id}")))?;
            if entry.notification.is_read && entry.sync == SyncState::Confirmed {
                return Ok(());
            }
            flip_read(entry);
        }

        let result = self.service.mark_as_read(id).await;
        self.settle(id, result.is_ok());
        if let Err(e) = &result {
            warn!(id, error = %e, "failed to mark notification as read");
        }
        result
    }

    /// Marks every unread notification read, locally first, with one
    /// concurrent backend call per entry.
    ///
    /// On partial failure all entries stay read locally, the failed ones are
    /// `Unconfirmed`, and the error names them.
    pub async fn mark_all_read(&self) -> Result<(), MedrentError> {
        let ids: Vec<u64> = {
            let mut entries = self.write();
            entries
                .iter_mut()
                .filter(|e| !e.notification.is_read || e.sync == SyncState::Unconfirmed)
                .map(|entry| {
                    flip_read(entry);
                    entry.notification.id
                })
                .collect()
        };
        if ids.is_empty() {
            return Ok(());
        }

        let results =
            futures::future::join_all(ids.iter().map(|&id| self.service.mark_as_read(id))).await;

        let mut failed = Vec::new();
        let mut first_error = None;
        for (&id, result) in ids.iter().zip(results) {
            self.settle(id, result.is_ok());
            if let Err(e) = result {
                failed.push(id);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            None => {
                debug!(count = ids.len(), "all notifications marked as read");
                Ok(())
            }
            Some(source) => {
                warn!(?failed, error = %source, "some notifications could not be marked as read");
                Err(MedrentError::PartialFailure {
                    failed,
                    source: Box::new(source),
                })
            }
        }
    }

    /// Prepends a notification that did not come from a fetch. An existing
    /// entry with the same id is replaced.
    pub fn append(&self, notification: Notification) {
        let mut entries = self.write();
        entries.retain(|e| e.notification.id != notification.id);
        entries.insert(
            0,
            NotificationEntry {
                notification,
                sync: SyncState::Confirmed,
            },
        );
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.read().iter().map(|e| e.notification.clone()).collect()
    }

    pub fn entries(&self) -> Vec<NotificationEntry> {
        self.read().clone()
    }

    pub fn unread_count(&self) -> usize {
        self.read().iter().filter(|e| !e.notification.is_read).count()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Ids whose local read mark the backend has not confirmed.
    pub fn unconfirmed(&self) -> Vec<u64> {
        self.read()
            .iter()
            .filter(|e| e.sync == SyncState::Unconfirmed)
            .map(|e| e.notification.id)
            .collect()
    }

    /// Drops everything, e.g. when the session ends.
    pub fn clear(&self) {
        self.write().clear();
    }

    fn settle(&self, id: u64, confirmed: bool) {
        let mut entries = self.write();
        // The entry may be gone if a fetch or clear ran meanwhile.
        if let Some(entry) = entries.iter_mut().find(|e| e.notification.id == id)
            && entry.sync == SyncState::Pending
        {
            entry.sync = if confirmed {
                SyncState::Confirmed
            } else {
                SyncState::Unconfirmed
            };
        }
    }
}

fn flip_read(entry: &mut NotificationEntry) {
    if !entry.notification.is_read {
        entry.notification.is_read = true;
        entry.notification.read_at = Some(Utc::now());
    }
    entry.sync = SyncState::Pending;
}

fn sort_newest_first(list: &mut [Notification]) {
    list.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}
