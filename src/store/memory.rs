use crate::core::store::{StoreError, StoreResult, SubscriptionStore, check_draft};
use crate::core::subscription::{Subscription, SubscriptionDraft, SubscriptionId};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

/// Non-persistent store keeping records in insertion order.
pub struct MemoryStore {
    inner: Mutex<Vec<Subscription>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Vec::new()),
        }
    }

    pub fn with_subscriptions(subscriptions: Vec<Subscription>) -> Self {
        Self {
            inner: Mutex::new(subscriptions),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn list_all(&self) -> StoreResult<Vec<Subscription>> {
        let subscriptions = self.inner.lock().await;
        debug!("Memory LIST returned {} records", subscriptions.len());
        Ok(subscriptions.clone())
    }

    async fn create(&self, draft: &SubscriptionDraft) -> StoreResult<SubscriptionId> {
        check_draft(draft)?;
        let id = SubscriptionId::generate();
        let mut subscriptions = self.inner.lock().await;
        subscriptions.push(Subscription::from_draft(id.clone(), draft.clone()));
        debug!("Memory CREATE for id: {}", id);
        Ok(id)
    }

    async fn update(&self, id: &SubscriptionId, draft: &SubscriptionDraft) -> StoreResult<()> {
        check_draft(draft)?;
        let mut subscriptions = self.inner.lock().await;
        let existing = subscriptions
            .iter_mut()
            .find(|sub| &sub.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        *existing = Subscription::from_draft(id.clone(), draft.clone());
        debug!("Memory UPDATE for id: {}", id);
        Ok(())
    }

    async fn delete(&self, id: &SubscriptionId) -> StoreResult<()> {
        let mut subscriptions = self.inner.lock().await;
        let position = subscriptions
            .iter()
            .position(|sub| &sub.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        subscriptions.remove(position);
        debug!("Memory DELETE for id: {}", id);
        Ok(())
    }
}
