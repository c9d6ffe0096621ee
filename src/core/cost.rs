//! Normalizes subscription costs to a per-month figure.
use crate::core::subscription::BillingCycle;

/// Average number of weeks in a month. Not calendar exact.
pub const WEEKS_PER_MONTH: f64 = 4.33;

pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Converts `cost`, charged once per `billing` cycle, into its monthly equivalent.
///
/// Unrecognized cycles are treated as already monthly.
pub fn monthly_equivalent(cost: f64, billing: &BillingCycle) -> f64 {
    match billing {
        BillingCycle::Weekly => cost * WEEKS_PER_MONTH,
        BillingCycle::Monthly => cost,
        BillingCycle::Yearly => cost / MONTHS_PER_YEAR,
        BillingCycle::Other(_) => cost,
    }
}
