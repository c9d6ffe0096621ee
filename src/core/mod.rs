//! Core business logic abstractions

pub mod analytics;
pub mod clock;
pub mod config;
pub mod cost;
pub mod log;
pub mod refresh;
pub mod store;
pub mod subscription;

// Re-export main types for cleaner imports
pub use analytics::{CategoryBreakdown, DashboardView, UpcomingPayment};
pub use clock::{Clock, FixedClock, SystemClock};
pub use refresh::{RefreshController, RenderTarget, Submission};
pub use store::{StoreError, StoreResult, SubscriptionStore};
pub use subscription::{BillingCycle, Subscription, SubscriptionDraft, SubscriptionId};
