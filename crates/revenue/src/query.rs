use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use salesbook_core::{DomainError, DomainResult, GroupBy};

/// Report request as received from the HTTP layer.
///
/// `from`/`to` are ISO-8601: an RFC 3339 timestamp, a naive timestamp (read
/// as UTC), or a bare `YYYY-MM-DD`. A bare `to` date covers that whole day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default, rename = "groupBy", alias = "group_by")]
    pub group_by: Option<GroupBy>,
}

/// Inclusive UTC window; an open end matches everything on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn parse(from: Option<&str>, to: Option<&str>) -> DomainResult<Self> {
        let from = from.map(|s| parse_bound(s, Bound::Start)).transpose()?;
        let to = to.map(|s| parse_bound(s, Bound::End)).transpose()?;

        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(DomainError::validation(format!(
                    "report range starts after it ends ({f} > {t})"
                )));
            }
        }

        Ok(Self { from, to })
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.from.is_none_or(|f| ts >= f) && self.to.is_none_or(|t| ts <= t)
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

fn parse_bound(raw: &str, bound: Bound) -> DomainResult<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let time = match bound {
            Bound::Start => NaiveTime::MIN,
            Bound::End => NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
                .unwrap_or(NaiveTime::MIN),
        };
        return Ok(date.and_time(time).and_utc());
    }

    Err(DomainError::validation(format!("invalid ISO-8601 date: {raw:?}")))
}
