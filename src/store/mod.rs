pub mod disk;
pub mod memory;
pub mod remote;
pub mod util;

use crate::core::config::{AppConfig, StorageBackend};
use crate::core::store::SubscriptionStore;
use anyhow::{Context, Result, anyhow};
use disk::DiskStore;
use memory::MemoryStore;
use remote::RemoteStore;
use std::sync::Arc;
use tracing::debug;

/// Opens the store selected by `config.storage.backend`.
pub fn open(config: &AppConfig) -> Result<Arc<dyn SubscriptionStore>> {
    match config.storage.backend {
        StorageBackend::Local => {
            let path = config.default_data_path()?;
            debug!("Using local store at {}", path.display());
            let store = DiskStore::open(&path)
                .with_context(|| format!("Failed to open local store at {}", path.display()))?;
            Ok(Arc::new(store))
        }
        StorageBackend::Remote => {
            let remote = config
                .storage
                .remote
                .as_ref()
                .ok_or_else(|| anyhow!("storage.remote must be configured for the remote backend"))?;
            debug!(
                "Using remote store for project {} at {}",
                remote.project_id, remote.base_url
            );
            Ok(Arc::new(
                RemoteStore::new(remote).context("Failed to create remote store")?,
            ))
        }
        StorageBackend::Memory => {
            debug!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
