use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use salesbook_core::money::{BP_SCALE, checked_add};
use salesbook_core::{DomainError, DomainResult, GroupBy, period_key};

use crate::classify::{Recognition, RevenueEntry, SourceKind};
use crate::store::DataSource;

/// Amounts split by where they came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBreakdown {
    pub one_time_invoices: u64,
    pub payment_schedules: u64,
    pub recurring_revenue: u64,
}

impl SourceBreakdown {
    pub fn get(&self, kind: SourceKind) -> u64 {
        match kind {
            SourceKind::OneTimeInvoices => self.one_time_invoices,
            SourceKind::PaymentSchedules => self.payment_schedules,
            SourceKind::RecurringRevenue => self.recurring_revenue,
        }
    }

    pub fn add(&mut self, kind: SourceKind, amount: u64) -> DomainResult<()> {
        let slot = match kind {
            SourceKind::OneTimeInvoices => &mut self.one_time_invoices,
            SourceKind::PaymentSchedules => &mut self.payment_schedules,
            SourceKind::RecurringRevenue => &mut self.recurring_revenue,
        };
        *slot = checked_add(*slot, amount, "revenue")?;
        Ok(())
    }

    pub fn total(&self) -> DomainResult<u64> {
        SourceKind::ALL
            .iter()
            .try_fold(0, |acc, &kind| checked_add(acc, self.get(kind), "revenue"))
    }

    pub fn merge(mut self, other: &SourceBreakdown) -> DomainResult<Self> {
        for kind in SourceKind::ALL {
            self.add(kind, other.get(kind))?;
        }
        Ok(self)
    }
}

/// Partial aggregation over some subset of in-range entries.
///
/// Partials built over disjoint subsets can be merged in any order and
/// grouping with the same result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTotals {
    pub realized: SourceBreakdown,
    pub pending: SourceBreakdown,
    pub realized_cogs_minor: u64,
    /// Realized revenue keyed by period.
    pub series: BTreeMap<String, SourceBreakdown>,
}

impl SourceTotals {
    pub fn record(&mut self, entry: &RevenueEntry<'_>, group_by: GroupBy) -> DomainResult<()> {
        let kind = entry.source();
        let amount = entry.amount_minor();

        match entry.recognition() {
            Recognition::Realized(at) => {
                self.realized.add(kind, amount)?;
                self.realized_cogs_minor =
                    checked_add(self.realized_cogs_minor, entry.cogs_minor()?, "cogs")?;
                self.series
                    .entry(period_key(at, group_by))
                    .or_default()
                    .add(kind, amount)?;
            }
            Recognition::Pending(_) => self.pending.add(kind, amount)?,
        }
        Ok(())
    }

    pub fn merge(mut self, other: SourceTotals) -> DomainResult<Self> {
        self.realized = self.realized.merge(&other.realized)?;
        self.pending = self.pending.merge(&other.pending)?;
        self.realized_cogs_minor =
            checked_add(self.realized_cogs_minor, other.realized_cogs_minor, "cogs")?;
        for (period, breakdown) in other.series {
            let slot = self.series.entry(period).or_default();
            *slot = slot.merge(&breakdown)?;
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenuePoint {
    pub period: String,
    pub total_revenue_minor: u64,
    pub sources: SourceBreakdown,
}

/// Report payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueReport {
    pub realized_total_minor: u64,
    pub pending_total_minor: u64,
    pub draft_total_minor: u64,
    pub lead_potential_minor: u64,
    pub realized_cogs_minor: u64,
    pub gross_profit_minor: u64,
    pub gross_margin_bp: u64,
    pub gross_margin_percent: f64,
    pub realized_by_source: SourceBreakdown,
    pub pending_by_source: SourceBreakdown,
    pub revenue: Vec<RevenuePoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degraded_sources: Vec<DataSource>,
}

impl RevenueReport {
    pub fn build(
        totals: SourceTotals,
        draft_total_minor: u64,
        lead_potential_minor: u64,
        degraded_sources: Vec<DataSource>,
    ) -> DomainResult<Self> {
        let realized_total_minor = totals.realized.total()?;
        let pending_total_minor = totals.pending.total()?;
        let (gross_profit_minor, gross_margin_bp) =
            gross_margin(realized_total_minor, totals.realized_cogs_minor)?;

        let revenue = totals
            .series
            .into_iter()
            .map(|(period, sources)| {
                Ok(RevenuePoint {
                    period,
                    total_revenue_minor: sources.total()?,
                    sources,
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(Self {
            realized_total_minor,
            pending_total_minor,
            draft_total_minor,
            lead_potential_minor,
            realized_cogs_minor: totals.realized_cogs_minor,
            gross_profit_minor,
            gross_margin_bp,
            gross_margin_percent: margin_percent(gross_profit_minor, realized_total_minor),
            realized_by_source: totals.realized,
            pending_by_source: totals.pending,
            revenue,
            degraded_sources,
        })
    }
}

/// `(max(0, realized - cogs), profit * 10000 / realized)`; margin is 0 when
/// nothing was realized.
pub fn gross_margin(realized_minor: u64, cogs_minor: u64) -> DomainResult<(u64, u64)> {
    let profit = realized_minor.saturating_sub(cogs_minor);
    if realized_minor == 0 {
        return Ok((profit, 0));
    }
    let bp = u128::from(profit) * u128::from(BP_SCALE) / u128::from(realized_minor);
    let bp = u64::try_from(bp).map_err(|_| DomainError::invariant("gross margin overflow"))?;
    Ok((profit, bp))
}

/// `profit * 100 / realized` as a float, 0 when nothing was realized.
pub fn margin_percent(profit_minor: u64, realized_minor: u64) -> f64 {
    if realized_minor == 0 {
        return 0.0;
    }
    profit_minor as f64 * 100.0 / realized_minor as f64
}
