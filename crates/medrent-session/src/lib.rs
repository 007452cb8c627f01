// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session store and token persistence for the Medrent client.
//!
//! [`SessionStore`] owns the logged-in state; [`FileTokenStore`] and
//! [`MemoryTokenStore`] are the two [`TokenStore`](medrent_core::TokenStore)
//! backends.

pub mod file;
pub mod memory;
pub mod store;

use std::sync::Arc;

use medrent_config::model::{SessionConfig, StoreKind};
use medrent_core::TokenStore;
use tracing::debug;

pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;
pub use store::{ClearReason, SessionStore};

/// Builds the token backend selected by configuration.
pub fn open_token_store(config: &SessionConfig) -> Arc<dyn TokenStore> {
    match config.store {
        StoreKind::File => {
            let path = config.resolved_path();
            debug!(path = %path.display(), "using file token store");
            Arc::new(FileTokenStore::new(path))
        }
        StoreKind::Memory => {
            debug!("using in-memory token store");
            Arc::new(MemoryTokenStore::new())
        }
    }
}
