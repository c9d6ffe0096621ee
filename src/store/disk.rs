use crate::core::store::{StoreError, StoreResult, SubscriptionStore, check_draft};
use crate::core::subscription::{Subscription, SubscriptionDraft, SubscriptionId};
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::{debug, error};

const PARTITION: &str = "subscriptions";

/// Persistent store on an embedded fjall keyspace.
///
/// Records are JSON values keyed by id. Ids are time ordered, so iterating
/// the partition yields records in creation order.
pub struct DiskStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskStore {
    pub fn open(path: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(path).map_err(StoreError::unavailable)?;
        let keyspace = Config::new(path).open().map_err(StoreError::unavailable)?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .map_err(StoreError::unavailable)?;
        debug!("Opened subscription store at {}", path.display());
        Ok(Self {
            keyspace,
            partition,
        })
    }

    fn write(&self, subscription: &Subscription) -> StoreResult<()> {
        let value = serde_json::to_vec(subscription).map_err(StoreError::unavailable)?;
        self.partition
            .insert(subscription.id.as_str(), value)
            .map_err(StoreError::unavailable)?;
        self.persist()
    }

    fn exists(&self, id: &SubscriptionId) -> StoreResult<bool> {
        self.partition
            .contains_key(id.as_str())
            .map_err(StoreError::unavailable)
    }

    fn persist(&self) -> StoreResult<()> {
        self.keyspace
            .persist(PersistMode::SyncAll)
            .map_err(StoreError::unavailable)
    }
}

#[async_trait]
impl SubscriptionStore for DiskStore {
    async fn list_all(&self) -> StoreResult<Vec<Subscription>> {
        let mut subscriptions = Vec::new();
        for entry in self.partition.iter() {
            let (key, value) = entry.map_err(StoreError::unavailable)?;
            match serde_json::from_slice::<Subscription>(&value) {
                Ok(subscription) => subscriptions.push(subscription),
                // The key stays in place and can still be deleted
                Err(e) => error!(
                    key = %String::from_utf8_lossy(&key),
                    error = %e,
                    "Skipping corrupt subscription record"
                ),
            }
        }
        debug!("Disk LIST returned {} records", subscriptions.len());
        Ok(subscriptions)
    }

    async fn create(&self, draft: &SubscriptionDraft) -> StoreResult<SubscriptionId> {
        check_draft(draft)?;
        let id = SubscriptionId::generate();
        self.write(&Subscription::from_draft(id.clone(), draft.clone()))?;
        debug!("Disk CREATE for id: {}", id);
        Ok(id)
    }

    async fn update(&self, id: &SubscriptionId, draft: &SubscriptionDraft) -> StoreResult<()> {
        check_draft(draft)?;
        if !self.exists(id)? {
            return Err(StoreError::NotFound(id.clone()));
        }
        self.write(&Subscription::from_draft(id.clone(), draft.clone()))?;
        debug!("Disk UPDATE for id: {}", id);
        Ok(())
    }

    async fn delete(&self, id: &SubscriptionId) -> StoreResult<()> {
        if !self.exists(id)? {
            return Err(StoreError::NotFound(id.clone()));
        }
        self.partition
            .remove(id.as_str())
            .map_err(StoreError::unavailable)?;
        self.persist()?;
        debug!("Disk DELETE for id: {}", id);
        Ok(())
    }
}
