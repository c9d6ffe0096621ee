//! Subscription records and the draft payload used to create or update them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

use crate::core::cost;

/// Opaque identifier assigned by a store when a record is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mints a time-ordered id, so lexicographic order follows creation order.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubscriptionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Recurrence period of a charge.
///
/// Labels other than the three known cycles are kept verbatim in `Other` and
/// normalized as if they were already monthly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BillingCycle {
    Weekly,
    Monthly,
    Yearly,
    Other(String),
}

impl BillingCycle {
    pub fn as_str(&self) -> &str {
        match self {
            BillingCycle::Weekly => "weekly",
            BillingCycle::Monthly => "monthly",
            BillingCycle::Yearly => "yearly",
            BillingCycle::Other(label) => label,
        }
    }

    /// Returns the unit used in "per ..." labels.
    pub fn period_label(&self) -> &str {
        match self {
            BillingCycle::Weekly => "week",
            BillingCycle::Monthly => "month",
            BillingCycle::Yearly => "year",
            BillingCycle::Other(label) => label,
        }
    }
}

impl From<&str> for BillingCycle {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "weekly" => BillingCycle::Weekly,
            "monthly" => BillingCycle::Monthly,
            "yearly" => BillingCycle::Yearly,
            _ => BillingCycle::Other(s.to_string()),
        }
    }
}

impl From<String> for BillingCycle {
    fn from(s: String) -> Self {
        BillingCycle::from(s.as_str())
    }
}

impl From<BillingCycle> for String {
    fn from(cycle: BillingCycle) -> Self {
        cycle.as_str().to_string()
    }
}

impl FromStr for BillingCycle {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(BillingCycle::from(s))
    }
}

impl Display for BillingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked subscription as persisted by a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: SubscriptionId,
    pub name: String,
    pub cost: f64,
    pub billing: BillingCycle,
    pub category: String,
    pub next_payment: NaiveDate,
}

impl Subscription {
    pub fn from_draft(id: SubscriptionId, draft: SubscriptionDraft) -> Self {
        Self {
            id,
            name: draft.name,
            cost: draft.cost,
            billing: draft.billing,
            category: draft.category,
            next_payment: draft.next_payment,
        }
    }

    pub fn monthly_cost(&self) -> f64 {
        cost::monthly_equivalent(self.cost, &self.billing)
    }

    pub fn to_draft(&self) -> SubscriptionDraft {
        SubscriptionDraft {
            name: self.name.clone(),
            cost: self.cost,
            billing: self.billing.clone(),
            category: self.category.clone(),
            next_payment: self.next_payment,
        }
    }
}

/// Subscription fields without an id; the payload of create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDraft {
    pub name: String,
    pub cost: f64,
    pub billing: BillingCycle,
    pub category: String,
    pub next_payment: NaiveDate,
}

impl SubscriptionDraft {
    /// A blank form: monthly billing, due on `today`.
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            name: String::new(),
            cost: 0.0,
            billing: BillingCycle::Monthly,
            category: "other".to_string(),
            next_payment: today,
        }
    }

    /// Checks the draft is fit to be written. The error is a user-facing reason.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name cannot be empty".to_string());
        }
        if !self.cost.is_finite() {
            return Err(format!("cost must be a finite number, got {}", self.cost));
        }
        if self.cost < 0.0 {
            return Err(format!("cost cannot be negative, got {:.2}", self.cost));
        }
        Ok(())
    }
}
