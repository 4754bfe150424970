//! Write-time pipeline: price the lines, project schedules, build rows.
//!
//! Either every row of an invoice is produced or none is; callers persist the
//! returned [`IssuedInvoice`] in one transaction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use salesbook_core::{DomainError, DomainResult, EngineConfig, OwnerId};
use salesbook_pricing::{InvoiceCalculation, LineItemInput, calculate_invoice};
use salesbook_products::{PaymentPlan, PaymentPlanId, Product, ProductId};
use salesbook_schedules::{generate_payment_schedule, generate_recurring_schedule};

use crate::invoice::{InvoiceId, InvoiceLineId, InvoiceLineRecord, InvoiceRecord, InvoiceStatus};
use crate::schedule::{PaymentScheduleRow, RecurringScheduleRow};

/// Command: IssueInvoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueInvoice {
    pub owner_id: OwnerId,
    pub invoice_id: InvoiceId,
    pub invoice_date: DateTime<Utc>,
    pub lines: Vec<LineItemInput>,
}

/// Everything to persist for a newly created invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedInvoice {
    pub invoice: InvoiceRecord,
    pub calculation: InvoiceCalculation,
    pub payment_schedule: Vec<PaymentScheduleRow>,
    pub recurring_schedule: Vec<RecurringScheduleRow>,
}

/// Price the invoice and project its schedules.
///
/// Per line: a recurring product gets billing cycles, a line with a payment
/// plan gets installments, anything else is one-time and gets no rows. A line
/// carrying both would be reported twice, so it is rejected.
pub fn issue_invoice(
    cmd: &IssueInvoice,
    products: &[Product],
    plans: &[PaymentPlan],
    config: &EngineConfig,
) -> DomainResult<IssuedInvoice> {
    let calculation = calculate_invoice(products, &cmd.lines)?;

    let catalog: HashMap<ProductId, &Product> = products.iter().map(|p| (p.id, p)).collect();
    let plans: HashMap<PaymentPlanId, &PaymentPlan> = plans.iter().map(|p| (p.id, p)).collect();

    let mut lines = Vec::with_capacity(calculation.lines.len());
    let mut payment_schedule = Vec::new();
    let mut recurring_schedule = Vec::new();

    for (idx, (line, input)) in calculation.lines.iter().zip(&cmd.lines).enumerate() {
        let product = catalog.get(&line.product_id).ok_or_else(|| {
            DomainError::validation(format!("product {} not found", line.product_id))
        })?;
        let line_id = InvoiceLineId::generate();
        let line_no = u32::try_from(idx + 1)
            .map_err(|_| DomainError::invariant("too many invoice lines"))?;

        if product.is_recurring() {
            if line.payment_plan_id.is_some() {
                return Err(DomainError::validation(format!(
                    "line {line_no}: payment plans cannot be applied to recurring product {}",
                    product.id
                )));
            }

            let entries = generate_recurring_schedule(
                product,
                line.total_minor,
                cmd.invoice_date,
                config.recurring_horizon_months,
                input.recurring_cycles,
            )?;
            recurring_schedule.extend(entries.into_iter().map(|entry| {
                RecurringScheduleRow::scheduled(cmd.owner_id, cmd.invoice_id, line_id, entry)
            }));
        } else if let Some(plan_id) = line.payment_plan_id {
            let plan = plans.get(&plan_id).ok_or_else(|| {
                DomainError::validation(format!("payment plan {plan_id} not found"))
            })?;

            let entries = generate_payment_schedule(plan, line.total_minor, cmd.invoice_date)?;
            payment_schedule.extend(entries.into_iter().map(|entry| {
                PaymentScheduleRow::pending(cmd.owner_id, cmd.invoice_id, line_id, entry)
            }));
        }

        lines.push(InvoiceLineRecord::from_calculated(
            line_id,
            cmd.invoice_id,
            line_no,
            line,
            product.recurring_interval,
        ));
    }

    let invoice = InvoiceRecord {
        id: cmd.invoice_id,
        owner_id: cmd.owner_id,
        status: InvoiceStatus::Draft,
        amount_minor: calculation.total_minor,
        created_at: cmd.invoice_date,
        paid_at: None,
        lines,
    };

    tracing::info!(
        invoice_id = %cmd.invoice_id,
        owner_id = %cmd.owner_id,
        lines = invoice.lines.len(),
        total_minor = calculation.total_minor,
        cogs_minor = calculation.cogs_minor,
        margin_minor = calculation.margin_minor,
        installments = payment_schedule.len(),
        billing_cycles = recurring_schedule.len(),
        "issued invoice"
    );

    Ok(IssuedInvoice {
        invoice,
        calculation,
        payment_schedule,
        recurring_schedule,
    })
}
