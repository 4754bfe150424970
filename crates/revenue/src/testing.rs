//! Row builders shared by the unit tests.

use chrono::{DateTime, TimeZone, Utc};

use salesbook_core::OwnerId;
use salesbook_invoicing::{
    InvoiceId, InvoiceLineId, InvoiceLineRecord, InvoiceRecord, InvoiceStatus, PaymentScheduleRow,
    PaymentStatus, RecurringScheduleRow, RecurringStatus, ScheduleRowId,
};
use salesbook_products::ProductId;

pub fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

pub fn line(invoice_id: InvoiceId, total_minor: u64, cogs_minor: u64) -> InvoiceLineRecord {
    InvoiceLineRecord {
        id: InvoiceLineId::generate(),
        invoice_id,
        line_no: 1,
        product_id: ProductId::generate(),
        quantity: 1,
        unit_price_minor: total_minor,
        subtotal_minor: total_minor,
        discount_minor: 0,
        tax_minor: 0,
        total_minor,
        cogs_minor,
        margin_minor: total_minor as i64 - cogs_minor as i64,
        payment_plan_id: None,
        recurring_interval: None,
    }
}

/// Invoice whose lines are `(total, cogs)` pairs and whose amount is their sum.
pub fn invoice(
    owner_id: OwnerId,
    status: InvoiceStatus,
    created_at: DateTime<Utc>,
    lines: Vec<(u64, u64)>,
) -> InvoiceRecord {
    let id = InvoiceId::generate();
    let lines: Vec<_> = lines
        .into_iter()
        .enumerate()
        .map(|(i, (total, cogs))| InvoiceLineRecord {
            line_no: i as u32 + 1,
            ..line(id, total, cogs)
        })
        .collect();
    InvoiceRecord {
        id,
        owner_id,
        status,
        amount_minor: lines.iter().map(|l| l.total_minor).sum(),
        created_at,
        paid_at: None,
        lines,
    }
}

pub fn payment_row(
    owner_id: OwnerId,
    line: &InvoiceLineRecord,
    amount_minor: u64,
    due_at: DateTime<Utc>,
    status: PaymentStatus,
) -> PaymentScheduleRow {
    PaymentScheduleRow {
        id: ScheduleRowId::generate(),
        owner_id,
        invoice_id: line.invoice_id,
        invoice_line_id: line.id,
        installment_num: 1,
        due_at,
        amount_minor,
        description: String::new(),
        status,
        paid_at: status.is_realized().then_some(due_at),
    }
}

pub fn recurring_row(
    owner_id: OwnerId,
    line: &InvoiceLineRecord,
    amount_minor: u64,
    billing_at: DateTime<Utc>,
    status: RecurringStatus,
) -> RecurringScheduleRow {
    RecurringScheduleRow {
        id: ScheduleRowId::generate(),
        owner_id,
        invoice_id: line.invoice_id,
        invoice_line_id: line.id,
        cycle_num: 1,
        billing_at,
        amount_minor,
        description: String::new(),
        status,
        billed_at: status.is_realized().then_some(billing_at),
    }
}
