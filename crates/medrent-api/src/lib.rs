// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authenticated REST client for the Medrent backend.
//!
//! - [`client`]: request building, bearer attachment, status mapping,
//!   timeout and cancellation.
//! - [`refresh`]: single-flight token renewal on 401 with one replay.
//! - [`resources`]: typed services over the backend's resource collections.
//! - [`redact`]: credential masking for logs and error messages.

pub mod client;
pub mod redact;
pub mod refresh;
pub mod resources;
pub mod wire;

pub use client::{ApiClient, ApiRequest, ApiResponse};
pub use redact::{RedactingWriter, SecretRegistry, redact};
pub use resources::{ListQuery, ResourceClient};
