//! Engine configuration.
//!
//! Values come from the environment with sane defaults; a malformed value is
//! logged and replaced by its default rather than failing startup.

use crate::calendar::GroupBy;

pub const ENV_RECURRING_HORIZON_MONTHS: &str = "SALESBOOK_RECURRING_HORIZON_MONTHS";
pub const ENV_DEFAULT_GROUP_BY: &str = "SALESBOOK_DEFAULT_GROUP_BY";
pub const ENV_LOG: &str = "SALESBOOK_LOG";

/// Months of recurring billing projected when a line has no explicit cycle cap.
pub const DEFAULT_RECURRING_HORIZON_MONTHS: u32 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub recurring_horizon_months: u32,
    pub default_group_by: GroupBy,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            recurring_horizon_months: DEFAULT_RECURRING_HORIZON_MONTHS,
            default_group_by: GroupBy::Month,
            log_filter: "info".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map instead of the process env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let recurring_horizon_months = match lookup(ENV_RECURRING_HORIZON_MONTHS) {
            Some(raw) => raw.trim().parse::<u32>().unwrap_or_else(|_| {
                tracing::warn!(
                    "{ENV_RECURRING_HORIZON_MONTHS}={raw:?} is not a month count; using {}",
                    defaults.recurring_horizon_months
                );
                defaults.recurring_horizon_months
            }),
            None => defaults.recurring_horizon_months,
        };

        let default_group_by = match lookup(ENV_DEFAULT_GROUP_BY) {
            Some(raw) => raw.trim().parse::<GroupBy>().unwrap_or_else(|err| {
                tracing::warn!("{ENV_DEFAULT_GROUP_BY}: {err}; using month");
                defaults.default_group_by
            }),
            None => defaults.default_group_by,
        };

        let log_filter = lookup(ENV_LOG)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.log_filter);

        Self {
            recurring_horizon_months,
            default_group_by,
            log_filter,
        }
    }
}
