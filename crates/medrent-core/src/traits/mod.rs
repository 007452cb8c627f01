// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the session layer and its persistence backends.
//!
//! Traits use `#[async_trait]` so implementations can be held as
//! `Arc<dyn TokenStore>`.

pub mod store;

pub use store::TokenStore;
