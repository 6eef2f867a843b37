//! Studio Store - remote asset store adapters
//!
//! Implementations of `studio_core::AssetStore`:
//! - `MemoryAssetStore`: in-process, optionally snapshotted to a JSON file
//! - `RestAssetStore`: PostgREST-style HTTP table
//!
//! `build_store` picks one from `StoreConfig`.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod memory;
pub mod rest;

pub use memory::MemoryAssetStore;
pub use rest::RestAssetStore;

use std::sync::Arc;
use studio_core::{AssetStore, StoreBackend, StoreConfig, StoreError};

/// Build the configured store adapter
///
/// # Errors
/// `StoreError::Config` for an incomplete REST configuration,
/// `StoreError::Persist` when the memory snapshot cannot be loaded.
pub async fn build_store(config: &StoreConfig) -> Result<Arc<dyn AssetStore>, StoreError> {
    match config.backend {
        StoreBackend::Memory => {
            let store = match &config.snapshot_path {
                Some(path) => MemoryAssetStore::open(path).await?,
                None => MemoryAssetStore::new(),
            };
            tracing::info!(
                snapshot = ?store.snapshot_path(),
                "using in-memory asset store"
            );
            Ok(Arc::new(store))
        }
        StoreBackend::Rest => {
            let store = RestAssetStore::new(config)?;
            tracing::info!(table = %store.table_url(), "using REST asset store");
            Ok(Arc::new(store))
        }
    }
}
