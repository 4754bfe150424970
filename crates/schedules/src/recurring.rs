use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use salesbook_core::{DomainResult, IntervalType, next_due_date};
use salesbook_products::Product;

use crate::cadence::check_projection;

/// One projected billing cycle of a recurring line. `cycle_num` starts at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringScheduleEntry {
    pub cycle_num: u32,
    pub billing_at: DateTime<Utc>,
    pub amount_minor: u64,
    pub description: String,
}

/// Number of cycles that fit in `horizon_months` for a cadence.
///
/// `CustomDays` reuses the month count as a cycle count; it is coarse but
/// existing schedules were generated that way.
pub fn cycles_in_horizon(interval: IntervalType, horizon_months: u32) -> u32 {
    match interval {
        IntervalType::Weekly => {
            u32::try_from(u64::from(horizon_months) * 30 / 7).unwrap_or(u32::MAX)
        }
        IntervalType::Monthly => horizon_months,
        IntervalType::Quarterly => horizon_months / 3,
        IntervalType::Semiannual => horizon_months / 6,
        IntervalType::Annual => horizon_months / 12,
        IntervalType::CustomDays => horizon_months,
    }
}

/// Expand a recurring product's line into future billing cycles.
///
/// One-time products yield no rows. Every cycle bills the full line total;
/// partial cycles are never prorated here.
pub fn generate_recurring_schedule(
    product: &Product,
    line_total_minor: u64,
    start: DateTime<Utc>,
    horizon_months: u32,
    cycles: Option<u32>,
) -> DomainResult<Vec<RecurringScheduleEntry>> {
    let Some(interval) = product.recurring_interval else {
        return Ok(Vec::new());
    };

    let count = cycles.unwrap_or_else(|| cycles_in_horizon(interval, horizon_months));
    check_projection("billing cycle", count, interval, product.recurring_interval_days)?;

    let entries = (1..=count)
        .map(|i| {
            let billing_at = next_due_date(start, i, interval, product.recurring_interval_days)?;
            Ok(RecurringScheduleEntry {
                cycle_num: i,
                billing_at,
                amount_minor: line_total_minor,
                description: format!("Billing cycle {i} of {count}"),
            })
        })
        .collect::<DomainResult<Vec<_>>>()?;

    tracing::debug!(
        product_id = %product.id,
        interval = %interval,
        cycles = count,
        "generated recurring schedule"
    );

    Ok(entries)
}
