//! Keeps the in-memory collection and the rendered view in step with the store.
//!
//! Every mutation goes to the store first; the collection is then reloaded
//! wholesale and the view recomputed. Refreshes carry a sequence number so a
//! slow, older fetch can never overwrite the result of a newer one.

use crate::core::analytics::{DEFAULT_UPCOMING_LIMIT, DashboardView};
use crate::core::clock::Clock;
use crate::core::store::{StoreError, StoreResult, SubscriptionStore};
use crate::core::subscription::{BillingCycle, Subscription, SubscriptionDraft, SubscriptionId};
use chrono::{Days, NaiveDate};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Refreshing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { sequence: u64 },
    /// A newer refresh had already been applied when this one completed.
    Discarded { sequence: u64, latest: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A user-visible message about the outcome of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Receives the recomputed view after each applied refresh.
///
/// Implementations are called with the controller state locked and must not
/// call back into the controller.
pub trait RenderTarget: Send + Sync {
    fn render(&self, view: &DashboardView);

    fn notify(&self, notice: &Notice);
}

/// Asks the user to approve a destructive action.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// A submitted subscription form.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Create(SubscriptionDraft),
    Update(SubscriptionId, SubscriptionDraft),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub upcoming_limit: usize,
    /// Seed demo records when the first load finds an empty store.
    pub seed_demo_data: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            upcoming_limit: DEFAULT_UPCOMING_LIMIT,
            seed_demo_data: true,
        }
    }
}

/// Records seeded into an empty store on first load, due shortly after `today`.
pub fn demo_subscriptions(today: NaiveDate) -> Vec<SubscriptionDraft> {
    let demo = |name: &str, cost: f64, category: &str, days: u64| SubscriptionDraft {
        name: name.to_string(),
        cost,
        billing: BillingCycle::Monthly,
        category: category.to_string(),
        next_payment: today + Days::new(days),
    };
    vec![
        demo("Netflix", 15.99, "entertainment", 10),
        demo("Spotify", 9.99, "music", 15),
        demo("Adobe Creative Cloud", 54.99, "software", 5),
    ]
}

#[derive(Default)]
struct ControllerState {
    collection: Vec<Subscription>,
    view: Option<DashboardView>,
    applied_sequence: u64,
    in_flight: usize,
}

pub struct RefreshController {
    store: Arc<dyn SubscriptionStore>,
    renderer: Arc<dyn RenderTarget>,
    clock: Arc<dyn Clock>,
    options: ControllerOptions,
    next_sequence: AtomicU64,
    state: Mutex<ControllerState>,
}

impl RefreshController {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        renderer: Arc<dyn RenderTarget>,
        clock: Arc<dyn Clock>,
        options: ControllerOptions,
    ) -> Self {
        Self {
            store,
            renderer,
            clock,
            options,
            next_sequence: AtomicU64::new(0),
            state: Mutex::new(ControllerState::default()),
        }
    }

    pub fn state(&self) -> RefreshState {
        if self.lock_state().in_flight > 0 {
            RefreshState::Refreshing
        } else {
            RefreshState::Idle
        }
    }

    /// Snapshot of the collection as of the last applied refresh.
    pub fn collection(&self) -> Vec<Subscription> {
        self.lock_state().collection.clone()
    }

    pub fn view(&self) -> Option<DashboardView> {
        self.lock_state().view.clone()
    }

    pub fn applied_sequence(&self) -> u64 {
        self.lock_state().applied_sequence
    }

    /// Initial load. Seeds demo records first if the store is empty and seeding is enabled.
    pub async fn load(&self) -> StoreResult<RefreshOutcome> {
        let sequence = self.begin_refresh();
        let mut fetched = self.store.list_all().await;

        if self.options.seed_demo_data && matches!(&fetched, Ok(subs) if subs.is_empty()) {
            info!("Store is empty, seeding demo subscriptions");
            fetched = match self.seed_demo_data().await {
                Ok(()) => self.store.list_all().await,
                Err(e) => Err(e),
            };
        }

        self.finish_refresh(sequence, fetched)
    }

    pub async fn refresh(&self) -> StoreResult<RefreshOutcome> {
        let sequence = self.begin_refresh();
        let fetched = self.store.list_all().await;
        self.finish_refresh(sequence, fetched)
    }

    /// Returns a blank form for a new subscription.
    pub fn on_add(&self) -> SubscriptionDraft {
        SubscriptionDraft::blank(self.clock.today())
    }

    /// Returns a form pre-filled from the current collection.
    pub fn on_edit(&self, id: &SubscriptionId) -> StoreResult<SubscriptionDraft> {
        let draft = self
            .lock_state()
            .collection
            .iter()
            .find(|sub| &sub.id == id)
            .map(Subscription::to_draft);
        draft.ok_or_else(|| self.surface(StoreError::NotFound(id.clone())))
    }

    /// Writes a submitted form to the store, then refreshes.
    ///
    /// A failed follow-up refresh is reported as a notice; the write itself
    /// still counts as done.
    pub async fn on_submit(&self, submission: Submission) -> StoreResult<SubscriptionId> {
        let (id, message) = match submission {
            Submission::Create(draft) => {
                let id = self
                    .store
                    .create(&draft)
                    .await
                    .map_err(|e| self.surface(e))?;
                info!(%id, name = %draft.name, "Created subscription");
                (id, format!("Added {}", draft.name))
            }
            Submission::Update(id, draft) => {
                self.store
                    .update(&id, &draft)
                    .await
                    .map_err(|e| self.surface(e))?;
                info!(%id, name = %draft.name, "Updated subscription");
                (id, format!("Updated {}", draft.name))
            }
        };

        self.renderer.notify(&Notice::info(message));
        self.refresh_after_mutation().await;
        Ok(id)
    }

    /// Deletes a subscription once `confirm` approves it, then refreshes.
    pub async fn on_delete(
        &self,
        id: &SubscriptionId,
        confirm: &dyn Confirm,
    ) -> StoreResult<DeleteOutcome> {
        let label = self
            .lock_state()
            .collection
            .iter()
            .find(|sub| &sub.id == id)
            .map_or_else(|| id.to_string(), |sub| sub.name.clone());

        if !confirm.confirm(&format!("Are you sure you want to delete {label}?")) {
            debug!(%id, "Delete cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }

        self.store.delete(id).await.map_err(|e| self.surface(e))?;
        info!(%id, "Deleted subscription");
        self.renderer.notify(&Notice::info(format!("Deleted {label}")));
        self.refresh_after_mutation().await;
        Ok(DeleteOutcome::Deleted)
    }

    async fn seed_demo_data(&self) -> StoreResult<()> {
        // Sequential: a create that was sent always runs to completion
        for draft in demo_subscriptions(self.clock.today()) {
            self.store.create(&draft).await?;
        }
        Ok(())
    }

    async fn refresh_after_mutation(&self) {
        if let Err(e) = self.refresh().await {
            debug!("Refresh after mutation failed: {}", e);
        }
    }

    fn begin_refresh(&self) -> u64 {
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock_state().in_flight += 1;
        debug!(sequence, "Refresh started");
        sequence
    }

    fn finish_refresh(
        &self,
        sequence: u64,
        fetched: StoreResult<Vec<Subscription>>,
    ) -> StoreResult<RefreshOutcome> {
        let mut state = self.lock_state();
        state.in_flight = state.in_flight.saturating_sub(1);

        // A superseded result is dropped whether it succeeded or failed
        if sequence < state.applied_sequence {
            debug!(
                sequence,
                latest = state.applied_sequence,
                failed = fetched.is_err(),
                "Discarding stale refresh"
            );
            return Ok(RefreshOutcome::Discarded {
                sequence,
                latest: state.applied_sequence,
            });
        }

        let subscriptions = match fetched {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                drop(state);
                return Err(self.surface(e));
            }
        };

        let view = DashboardView::compute(
            &subscriptions,
            self.clock.today(),
            self.options.upcoming_limit,
        );
        debug!(
            sequence,
            count = view.total_count,
            monthly = view.total_monthly_cost,
            "Refresh applied"
        );
        state.collection = subscriptions;
        state.applied_sequence = sequence;
        self.renderer.render(&view);
        state.view = Some(view);
        Ok(RefreshOutcome::Applied { sequence })
    }

    fn surface(&self, err: StoreError) -> StoreError {
        warn!(error = %err, "Store request failed");
        self.renderer.notify(&Notice::error(err.to_string()));
        err
    }

    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
