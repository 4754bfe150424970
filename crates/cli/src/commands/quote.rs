use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Args;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use salesbook_core::{EngineConfig, OwnerId};
use salesbook_invoicing::{
    InvoiceId, IssueInvoice, PaymentScheduleRow, RecurringScheduleRow, issue_invoice,
};
use salesbook_pricing::{InvoiceCalculation, LineItemInput};
use salesbook_products::{PaymentPlan, Product};

use crate::input;

#[derive(Args)]
pub struct QuoteArgs {
    /// Path to JSON input file (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<PathBuf>,
}

/// `quote` input document.
#[derive(Debug, Deserialize)]
pub struct QuoteInput {
    #[serde(default)]
    pub owner_id: Option<OwnerId>,
    pub products: Vec<Product>,
    #[serde(default)]
    pub plans: Vec<PaymentPlan>,
    pub invoice_date: DateTime<Utc>,
    pub lines: Vec<LineItemInput>,
}

#[derive(Debug, Serialize)]
pub struct QuoteOutput {
    pub calculation: InvoiceCalculation,
    pub payment_schedule: Vec<PaymentScheduleRow>,
    pub recurring_schedule: Vec<RecurringScheduleRow>,
}

pub fn run(args: QuoteArgs, config: &EngineConfig) -> anyhow::Result<Value> {
    let quote_input: QuoteInput = input::read_json(args.input.as_deref())?;
    Ok(serde_json::to_value(quote(quote_input, config)?)?)
}

pub fn quote(input: QuoteInput, config: &EngineConfig) -> anyhow::Result<QuoteOutput> {
    let cmd = IssueInvoice {
        owner_id: input.owner_id.unwrap_or_default(),
        invoice_id: InvoiceId::generate(),
        invoice_date: input.invoice_date,
        lines: input.lines,
    };
    let issued = issue_invoice(&cmd, &input.products, &input.plans, config)
        .context("could not price invoice")?;

    Ok(QuoteOutput {
        calculation: issued.calculation,
        payment_schedule: issued.payment_schedule,
        recurring_schedule: issued.recurring_schedule,
    })
}
