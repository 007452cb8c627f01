// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Medrent integration tests.
//!
//! # Components
//!
//! - [`MockBackend`] - wiremock server for the account and notification endpoints
//! - [`TestHarness`] - full client stack over a temp session file
//! - [`fixtures`] - canned users, notifications, and payloads

pub mod fixtures;
pub mod harness;
pub mod mock_backend;

pub use harness::{ClientStack, TestHarness};
pub use mock_backend::MockBackend;
