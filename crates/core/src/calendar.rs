//! Calendar arithmetic for installment and billing-cycle due dates.
//!
//! Month and year steps use *rollover* semantics rather than month-end
//! clamping: the day-of-month is carried over and overflows into the next
//! month when the target month is shorter (Jan 31 + 1 month = Mar 3, or
//! Mar 2 in a leap year). Stored schedules depend on these dates, so the
//! behavior must stay stable.

use core::str::FromStr;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Cadence of an installment plan or a recurring product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalType {
    Weekly,
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
    CustomDays,
}

impl IntervalType {
    pub fn as_str(self) -> &'static str {
        match self {
            IntervalType::Weekly => "weekly",
            IntervalType::Monthly => "monthly",
            IntervalType::Quarterly => "quarterly",
            IntervalType::Semiannual => "semiannual",
            IntervalType::Annual => "annual",
            IntervalType::CustomDays => "custom_days",
        }
    }
}

impl core::fmt::Display for IntervalType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntervalType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(IntervalType::Weekly),
            "monthly" => Ok(IntervalType::Monthly),
            "quarterly" => Ok(IntervalType::Quarterly),
            "semiannual" => Ok(IntervalType::Semiannual),
            "annual" => Ok(IntervalType::Annual),
            "custom_days" => Ok(IntervalType::CustomDays),
            other => Err(DomainError::validation(format!(
                "unrecognized interval type: {other}"
            ))),
        }
    }
}

/// Project `base` forward by `multiplier` whole cycles of `interval`.
///
/// `custom_days` is only consulted for [`IntervalType::CustomDays`] and
/// defaults to one day per cycle when absent.
pub fn next_due_date(
    base: DateTime<Utc>,
    multiplier: u32,
    interval: IntervalType,
    custom_days: Option<u32>,
) -> DomainResult<DateTime<Utc>> {
    let m = u64::from(multiplier);
    let projected = match interval {
        IntervalType::Weekly => add_days(base, 7 * m),
        IntervalType::Monthly => add_months_rollover(base, m),
        IntervalType::Quarterly => add_months_rollover(base, 3 * m),
        IntervalType::Semiannual => add_months_rollover(base, 6 * m),
        IntervalType::Annual => add_months_rollover(base, 12 * m),
        IntervalType::CustomDays => {
            let step = u64::from(custom_days.unwrap_or(1));
            step.checked_mul(m).and_then(|days| add_days(base, days))
        }
    };

    projected.ok_or_else(|| {
        DomainError::invariant(format!(
            "due date out of range ({base} + {multiplier} x {interval})"
        ))
    })
}

fn add_days(base: DateTime<Utc>, days: u64) -> Option<DateTime<Utc>> {
    base.checked_add_days(Days::new(days))
}

fn add_months_rollover(base: DateTime<Utc>, months: u64) -> Option<DateTime<Utc>> {
    let date = base.date_naive();
    let months = i64::try_from(months).ok()?;
    let index = i64::from(date.year())
        .checked_mul(12)?
        .checked_add(i64::from(date.month0()))?
        .checked_add(months)?;

    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;

    // Start from the 1st of the target month and walk the original day
    // forward, so short months overflow instead of clamping.
    let rolled = NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_days(Days::new(u64::from(date.day0())))?;

    Some(rolled.and_time(base.time()).and_utc())
}

/// Bucketing granularity for revenue series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Day,
    Week,
    #[default]
    Month,
}

impl FromStr for GroupBy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(GroupBy::Day),
            "week" => Ok(GroupBy::Week),
            "month" => Ok(GroupBy::Month),
            other => Err(DomainError::validation(format!("unrecognized group_by: {other}"))),
        }
    }
}

/// Period label for `ts`: `YYYY-MM-DD`, ISO week `YYYY-Www`, or `YYYY-MM`.
///
/// Labels sort lexicographically in chronological order.
pub fn period_key(ts: DateTime<Utc>, group_by: GroupBy) -> String {
    match group_by {
        GroupBy::Day => ts.format("%Y-%m-%d").to_string(),
        GroupBy::Week => {
            let week = ts.iso_week();
            format!("{}-W{:02}", week.year(), week.week())
        }
        GroupBy::Month => ts.format("%Y-%m").to_string(),
    }
}
