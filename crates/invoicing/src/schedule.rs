//! Persisted schedule rows.
//!
//! This engine creates rows in their initial status only. Moving a row to
//! `paid`/`billed` or `overdue` is the payment processor's job, serialized
//! per row by the storage layer. `overdue` has no modeled way back to
//! `pending` and no terminal state beyond it; it stays a pending sub-status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use salesbook_core::{OwnerId, entity_id};
use salesbook_schedules::{PaymentScheduleEntry, RecurringScheduleEntry};

use crate::invoice::{InvoiceId, InvoiceLineId};

entity_id!(
    /// Identifier of a payment or recurring schedule row.
    ScheduleRowId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Overdue,
}

impl PaymentStatus {
    pub fn is_realized(self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurringStatus {
    Scheduled,
    Billed,
}

impl RecurringStatus {
    pub fn is_realized(self) -> bool {
        matches!(self, RecurringStatus::Billed)
    }
}

/// `invoice_payment_schedules` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentScheduleRow {
    pub id: ScheduleRowId,
    pub owner_id: OwnerId,
    pub invoice_id: InvoiceId,
    pub invoice_line_id: InvoiceLineId,
    pub installment_num: u32,
    pub due_at: DateTime<Utc>,
    pub amount_minor: u64,
    #[serde(default)]
    pub description: String,
    pub status: PaymentStatus,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

impl PaymentScheduleRow {
    /// New `pending` row for a generated entry.
    pub fn pending(
        owner_id: OwnerId,
        invoice_id: InvoiceId,
        invoice_line_id: InvoiceLineId,
        entry: PaymentScheduleEntry,
    ) -> Self {
        Self {
            id: ScheduleRowId::generate(),
            owner_id,
            invoice_id,
            invoice_line_id,
            installment_num: entry.installment_num,
            due_at: entry.due_at,
            amount_minor: entry.amount_minor,
            description: entry.description,
            status: PaymentStatus::Pending,
            paid_at: None,
        }
    }
}

/// `recurring_revenue_schedules` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringScheduleRow {
    pub id: ScheduleRowId,
    pub owner_id: OwnerId,
    pub invoice_id: InvoiceId,
    pub invoice_line_id: InvoiceLineId,
    pub cycle_num: u32,
    pub billing_at: DateTime<Utc>,
    pub amount_minor: u64,
    #[serde(default)]
    pub description: String,
    pub status: RecurringStatus,
    #[serde(default)]
    pub billed_at: Option<DateTime<Utc>>,
}

impl RecurringScheduleRow {
    /// New `scheduled` row for a generated entry.
    pub fn scheduled(
        owner_id: OwnerId,
        invoice_id: InvoiceId,
        invoice_line_id: InvoiceLineId,
        entry: RecurringScheduleEntry,
    ) -> Self {
        Self {
            id: ScheduleRowId::generate(),
            owner_id,
            invoice_id,
            invoice_line_id,
            cycle_num: entry.cycle_num,
            billing_at: entry.billing_at,
            amount_minor: entry.amount_minor,
            description: entry.description,
            status: RecurringStatus::Scheduled,
            billed_at: None,
        }
    }
}
