use salesbook_core::{DomainError, DomainResult, IntervalType};

/// Upper bound on rows projected for one line (100 years of monthly cycles).
pub const MAX_SCHEDULE_ROWS: u32 = 1_200;

/// Reject cadences that cannot advance and counts no caller could persist.
pub(crate) fn check_projection(
    what: &str,
    count: u32,
    interval: IntervalType,
    interval_days: Option<u32>,
) -> DomainResult<()> {
    if count > MAX_SCHEDULE_ROWS {
        return Err(DomainError::validation(format!(
            "{what} count {count} exceeds the limit of {MAX_SCHEDULE_ROWS}"
        )));
    }
    if interval == IntervalType::CustomDays && interval_days == Some(0) {
        return Err(DomainError::validation(format!(
            "{what} cadence custom_days needs a positive day count"
        )));
    }
    Ok(())
}
