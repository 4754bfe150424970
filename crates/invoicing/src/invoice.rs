use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use salesbook_core::{DomainResult, IntervalType, OwnerId, entity_id, money};
use salesbook_pricing::CalculatedLineItem;
use salesbook_products::{PaymentPlanId, ProductId};

entity_id!(
    /// Invoice identifier.
    InvoiceId
);

entity_id!(
    /// Invoice line identifier.
    InvoiceLineId
);

/// Invoice status lifecycle (owned by the CRM; read-only here).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Void,
}

/// Persisted invoice line: a frozen snapshot of the calculated pricing.
///
/// Revenue reporting prorates against these values and never reprices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLineRecord {
    pub id: InvoiceLineId,
    pub invoice_id: InvoiceId,
    pub line_no: u32,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price_minor: u64,
    pub subtotal_minor: u64,
    pub discount_minor: u64,
    pub tax_minor: u64,
    pub total_minor: u64,
    pub cogs_minor: u64,
    pub margin_minor: i64,
    #[serde(default)]
    pub payment_plan_id: Option<PaymentPlanId>,
    /// The product's cadence when the line was issued; `None` for one-time lines.
    #[serde(default)]
    pub recurring_interval: Option<IntervalType>,
}

impl InvoiceLineRecord {
    pub fn from_calculated(
        id: InvoiceLineId,
        invoice_id: InvoiceId,
        line_no: u32,
        line: &CalculatedLineItem,
        recurring_interval: Option<IntervalType>,
    ) -> Self {
        Self {
            id,
            invoice_id,
            line_no,
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price_minor: line.unit_price_minor,
            subtotal_minor: line.subtotal_minor,
            discount_minor: line.discount_minor,
            tax_minor: line.tax_minor,
            total_minor: line.total_minor,
            cogs_minor: line.cogs_minor,
            margin_minor: line.margin_minor,
            payment_plan_id: line.payment_plan_id,
            recurring_interval,
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.recurring_interval.is_some()
    }
}

/// Persisted invoice header with its line snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub id: InvoiceId,
    pub owner_id: OwnerId,
    pub status: InvoiceStatus,
    /// Invoice total in smallest currency unit.
    pub amount_minor: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lines: Vec<InvoiceLineRecord>,
}

impl InvoiceRecord {
    pub fn has_recurring_line(&self) -> bool {
        self.lines.iter().any(InvoiceLineRecord::is_recurring)
    }

    pub fn has_payment_plan_line(&self) -> bool {
        self.lines.iter().any(|l| l.payment_plan_id.is_some())
    }

    /// Full cost of the invoice: the sum of its frozen line cogs.
    pub fn cogs_minor(&self) -> DomainResult<u64> {
        self.lines
            .iter()
            .try_fold(0, |acc, l| money::checked_add(acc, l.cogs_minor, "invoice cogs"))
    }

    /// When the invoice counts as realized: payment time, else creation time.
    pub fn realized_at(&self) -> DateTime<Utc> {
        self.paid_at.unwrap_or(self.created_at)
    }
}
