//! Provides functions for deriving spend statistics from a set of subscriptions.
use crate::core::cost::MONTHS_PER_YEAR;
use crate::core::subscription::{BillingCycle, Subscription, SubscriptionId};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

pub const DEFAULT_UPCOMING_LIMIT: usize = 5;

/// Represents the summed monthly cost of every subscription sharing a category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub monthly_cost: f64,
}

/// Per-category totals, or `NoData` when there was nothing to group.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryBreakdown {
    NoData,
    Totals(Vec<CategoryTotal>),
}

impl CategoryBreakdown {
    pub fn as_slice(&self) -> &[CategoryTotal] {
        match self {
            CategoryBreakdown::NoData => &[],
            CategoryBreakdown::Totals(totals) => totals,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

/// Represents a single entry of the upcoming payments view.
#[derive(Debug, Clone, PartialEq)]
pub struct UpcomingPayment {
    pub id: SubscriptionId,
    pub name: String,
    pub cost: f64,
    pub billing: BillingCycle,
    pub due: NaiveDate,
    /// Whole days from today until `due`; zero today, negative once overdue.
    pub days_until: i64,
}

impl UpcomingPayment {
    pub fn is_overdue(&self) -> bool {
        self.days_until < 0
    }
}

pub fn total_count(subscriptions: &[Subscription]) -> usize {
    subscriptions.len()
}

pub fn total_monthly_cost(subscriptions: &[Subscription]) -> f64 {
    // Sum for f64 starts at -0.0, which would print as "-0.00"
    subscriptions
        .iter()
        .map(Subscription::monthly_cost)
        .fold(0.0, |total, cost| total + cost)
}

pub fn total_yearly_cost(subscriptions: &[Subscription]) -> f64 {
    total_monthly_cost(subscriptions) * MONTHS_PER_YEAR
}

/// Groups monthly costs by category, largest first.
///
/// Categories with equal totals keep the order in which they were first seen.
pub fn category_breakdown(subscriptions: &[Subscription]) -> CategoryBreakdown {
    if subscriptions.is_empty() {
        return CategoryBreakdown::NoData;
    }

    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for sub in subscriptions {
        let monthly_cost = sub.monthly_cost();
        match positions.get(sub.category.as_str()) {
            Some(&index) => totals[index].monthly_cost += monthly_cost,
            None => {
                positions.insert(sub.category.as_str(), totals.len());
                totals.push(CategoryTotal {
                    category: sub.category.clone(),
                    monthly_cost,
                });
            }
        }
    }

    // sort_by is stable, which keeps ties in encounter order
    totals.sort_by(|a, b| {
        b.monthly_cost
            .partial_cmp(&a.monthly_cost)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    debug!(
        "Grouped {} subscriptions into {} categories",
        subscriptions.len(),
        totals.len()
    );
    CategoryBreakdown::Totals(totals)
}

/// Returns the first `limit` subscriptions by next payment date, soonest first.
pub fn upcoming_payments(
    subscriptions: &[Subscription],
    today: NaiveDate,
    limit: usize,
) -> Vec<UpcomingPayment> {
    let mut sorted: Vec<&Subscription> = subscriptions.iter().collect();
    sorted.sort_by_key(|sub| sub.next_payment);

    sorted
        .into_iter()
        .take(limit)
        .map(|sub| UpcomingPayment {
            id: sub.id.clone(),
            name: sub.name.clone(),
            cost: sub.cost,
            billing: sub.billing.clone(),
            due: sub.next_payment,
            days_until: (sub.next_payment - today).num_days(),
        })
        .collect()
}

/// Represents everything a render target shows after a refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub today: NaiveDate,
    pub subscriptions: Vec<Subscription>,
    pub total_count: usize,
    pub total_monthly_cost: f64,
    pub total_yearly_cost: f64,
    pub categories: CategoryBreakdown,
    pub upcoming: Vec<UpcomingPayment>,
}

impl DashboardView {
    pub fn compute(
        subscriptions: &[Subscription],
        today: NaiveDate,
        upcoming_limit: usize,
    ) -> Self {
        Self {
            today,
            subscriptions: subscriptions.to_vec(),
            total_count: total_count(subscriptions),
            total_monthly_cost: total_monthly_cost(subscriptions),
            total_yearly_cost: total_yearly_cost(subscriptions),
            categories: category_breakdown(subscriptions),
            upcoming: upcoming_payments(subscriptions, today, upcoming_limit),
        }
    }
}
