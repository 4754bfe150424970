//! Single-pass partition of persisted rows into revenue entries.
//!
//! Every schedule row becomes a [`RevenueEntry::ScheduleBacked`], every
//! recurring row a [`RevenueEntry::RecurringBacked`]. A paid invoice becomes
//! [`RevenueEntry::OneTime`] only when neither kind of row points at it and
//! none of its lines recur, so one payment is never counted twice.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use salesbook_core::DomainResult;
use salesbook_invoicing::{
    InvoiceId, InvoiceLineId, InvoiceLineRecord, InvoiceRecord, InvoiceStatus, PaymentScheduleRow,
    RecurringScheduleRow,
};

use crate::proration::prorated_cogs;
use crate::store::{DataSource, RowSnapshot};

/// Where a piece of revenue comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    OneTimeInvoices,
    PaymentSchedules,
    RecurringRevenue,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [
        SourceKind::OneTimeInvoices,
        SourceKind::PaymentSchedules,
        SourceKind::RecurringRevenue,
    ];
}

/// Realized or still expected, and the timestamp that places it in a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recognition {
    Realized(DateTime<Utc>),
    Pending(DateTime<Utc>),
}

impl Recognition {
    pub fn at(self) -> DateTime<Utc> {
        match self {
            Recognition::Realized(at) | Recognition::Pending(at) => at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevenueEntry<'a> {
    OneTime {
        invoice: &'a InvoiceRecord,
    },
    ScheduleBacked {
        row: &'a PaymentScheduleRow,
        line: Option<&'a InvoiceLineRecord>,
    },
    RecurringBacked {
        row: &'a RecurringScheduleRow,
        line: Option<&'a InvoiceLineRecord>,
    },
}

impl RevenueEntry<'_> {
    pub fn source(&self) -> SourceKind {
        match self {
            RevenueEntry::OneTime { .. } => SourceKind::OneTimeInvoices,
            RevenueEntry::ScheduleBacked { .. } => SourceKind::PaymentSchedules,
            RevenueEntry::RecurringBacked { .. } => SourceKind::RecurringRevenue,
        }
    }

    pub fn invoice_id(&self) -> InvoiceId {
        match self {
            RevenueEntry::OneTime { invoice } => invoice.id,
            RevenueEntry::ScheduleBacked { row, .. } => row.invoice_id,
            RevenueEntry::RecurringBacked { row, .. } => row.invoice_id,
        }
    }

    pub fn amount_minor(&self) -> u64 {
        match self {
            RevenueEntry::OneTime { invoice } => invoice.amount_minor,
            RevenueEntry::ScheduleBacked { row, .. } => row.amount_minor,
            RevenueEntry::RecurringBacked { row, .. } => row.amount_minor,
        }
    }

    /// A paid row without `paid_at` falls back to its due date; a billed row
    /// without `billed_at` to its billing date.
    pub fn recognition(&self) -> Recognition {
        match self {
            RevenueEntry::OneTime { invoice } => Recognition::Realized(invoice.realized_at()),
            RevenueEntry::ScheduleBacked { row, .. } if row.status.is_realized() => {
                Recognition::Realized(row.paid_at.unwrap_or(row.due_at))
            }
            RevenueEntry::ScheduleBacked { row, .. } => Recognition::Pending(row.due_at),
            RevenueEntry::RecurringBacked { row, .. } if row.status.is_realized() => {
                Recognition::Realized(row.billed_at.unwrap_or(row.billing_at))
            }
            RevenueEntry::RecurringBacked { row, .. } => Recognition::Pending(row.billing_at),
        }
    }

    /// Cost attributed to this entry: full line cogs for a one-time invoice,
    /// a prorated share for a schedule or recurring row.
    pub fn cogs_minor(&self) -> DomainResult<u64> {
        match self {
            RevenueEntry::OneTime { invoice } => invoice.cogs_minor(),
            RevenueEntry::ScheduleBacked { row, line } => {
                Ok(prorated_cogs(row.id, row.amount_minor, *line))
            }
            RevenueEntry::RecurringBacked { row, line } => {
                Ok(prorated_cogs(row.id, row.amount_minor, *line))
            }
        }
    }
}

/// Classify every row of `rows` exactly once.
///
/// When the payment schedule fetch is listed in `degraded`, invoices with a
/// payment-plan line still count as schedule-backed so a missing row set
/// cannot turn them into one-time revenue.
pub fn classify<'a>(rows: &'a RowSnapshot, degraded: &[DataSource]) -> Vec<RevenueEntry<'a>> {
    let lines: HashMap<InvoiceLineId, &InvoiceLineRecord> = rows
        .invoices
        .iter()
        .flat_map(|inv| inv.lines.iter())
        .map(|l| (l.id, l))
        .collect();

    let mut backed: HashSet<InvoiceId> = rows
        .payment_schedules
        .iter()
        .map(|r| r.invoice_id)
        .chain(rows.recurring_schedules.iter().map(|r| r.invoice_id))
        .collect();
    backed.extend(
        rows.invoices
            .iter()
            .filter(|inv| inv.has_recurring_line())
            .map(|inv| inv.id),
    );
    if degraded.contains(&DataSource::PaymentSchedules) {
        backed.extend(
            rows.invoices
                .iter()
                .filter(|inv| inv.has_payment_plan_line())
                .map(|inv| inv.id),
        );
    }

    let mut entries = Vec::with_capacity(
        rows.payment_schedules.len() + rows.recurring_schedules.len() + rows.invoices.len(),
    );

    entries.extend(rows.payment_schedules.iter().map(|row| RevenueEntry::ScheduleBacked {
        row,
        line: lines.get(&row.invoice_line_id).copied(),
    }));
    entries.extend(rows.recurring_schedules.iter().map(|row| RevenueEntry::RecurringBacked {
        row,
        line: lines.get(&row.invoice_line_id).copied(),
    }));
    entries.extend(
        rows.invoices
            .iter()
            .filter(|inv| inv.status == InvoiceStatus::Paid && !backed.contains(&inv.id))
            .map(|invoice| RevenueEntry::OneTime { invoice }),
    );

    tracing::debug!(
        entries = entries.len(),
        backed_invoices = backed.len(),
        "classified revenue rows"
    );
    entries
}
