//! Persistence contract for subscription records.

use crate::core::subscription::{Subscription, SubscriptionDraft, SubscriptionId};
use async_trait::async_trait;
use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures a store can report. None of them are fatal; the user can retry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The backend could not be reached or failed to complete the request.
    #[error("Subscription store unavailable: {0}")]
    Unavailable(String),

    /// The targeted record does not exist, usually because the local view is stale.
    #[error("Subscription {0} not found")]
    NotFound(SubscriptionId),

    /// The write was malformed and the store refused it.
    #[error("Subscription rejected: {0}")]
    ValidationRejected(String),
}

impl StoreError {
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Validates a draft the way every store does before writing it.
pub fn check_draft(draft: &SubscriptionDraft) -> StoreResult<()> {
    draft.validate().map_err(StoreError::ValidationRejected)
}

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn list_all(&self) -> StoreResult<Vec<Subscription>>;

    async fn create(&self, draft: &SubscriptionDraft) -> StoreResult<SubscriptionId>;

    async fn update(&self, id: &SubscriptionId, draft: &SubscriptionDraft) -> StoreResult<()>;

    async fn delete(&self, id: &SubscriptionId) -> StoreResult<()>;
}
