// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `medrent notifications ...`

use std::time::Duration;

use clap::Subcommand;
use medrent_core::{MedrentError, SessionEvent};
use medrent_notify::NotificationPoller;
use tokio::sync::broadcast::error::RecvError;

use crate::app::App;
use crate::output::Output;
use crate::shutdown;

#[derive(Debug, Subcommand)]
pub enum NotificationCommand {
    /// List notifications, newest first.
    List {
        /// Only unread notifications.
        #[arg(long)]
        unread: bool,
    },
    /// Mark one notification as read.
    Read { id: u64 },
    /// Mark every unread notification as read.
    ReadAll,
    /// Keep the list refreshed in the background and print the unread count
    /// whenever it changes. Stops on Ctrl+C.
    Watch {
        /// Seconds between refreshes (defaults to `notifications.poll_interval_secs`).
        #[arg(long)]
        interval: Option<u64>,
    },
}

pub async fn run(app: &App, command: NotificationCommand, out: &Output) -> Result<(), MedrentError> {
    app.require_user()?;
    let cache = &app.notifications;

    match command {
        NotificationCommand::List { unread } => {
            cache.fetch_all().await?;
            let mut entries = cache.entries();
            if unread {
                entries.retain(|e| !e.notification.is_read);
            }
            out.notifications(&entries, cache.unread_count());
        }
        NotificationCommand::Read { id } => {
            cache.fetch_all().await?;
            cache.mark_read(id).await?;
            out.done(&format!("notification {id} marked as read"));
        }
        NotificationCommand::ReadAll => {
            cache.fetch_all().await?;
            let before = cache.unread_count();
            cache.mark_all_read().await?;
            out.done(&format!("{before} notification(s) marked as read"));
        }
        NotificationCommand::Watch { interval } => watch(app, interval, out).await?,
    }
    Ok(())
}

async fn watch(app: &App, interval: Option<u64>, out: &Output) -> Result<(), MedrentError> {
    if !app.config.notifications.enabled {
        return Err(MedrentError::Config(
            "notification polling is disabled (notifications.enabled = false)".into(),
        ));
    }
    let cancel = shutdown::install_signal_handler();
    let poller = match interval {
        Some(secs) if secs > 0 => NotificationPoller::new(
            app.notifications.clone(),
            app.session.clone(),
            Duration::from_secs(secs),
        ),
        Some(_) => return Err(MedrentError::validation("--interval must be positive")),
        None => NotificationPoller::from_config(
            &app.config.notifications,
            app.notifications.clone(),
            app.session.clone(),
        ),
    };
    let handle = poller.spawn(cancel.clone());

    // The poller refreshes on its first tick; report each change after that.
    let mut events = app.session.subscribe();
    let mut report = tokio::time::interval(Duration::from_secs(1));
    let mut last = None;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = report.tick() => {
                let unread = app.notifications.unread_count();
                if last != Some(unread) && !app.notifications.is_empty() {
                    out.notifications(&app.notifications.entries(), unread);
                    last = Some(unread);
                }
            }
            event = events.recv() => match event {
                Ok(SessionEvent::LoginRequired { reason }) => {
                    cancel.cancel();
                    let _ = handle.await;
                    return Err(MedrentError::AuthExpired(reason));
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
        }
    }

    cancel.cancel();
    let _ = handle.await;
    Ok(())
}
