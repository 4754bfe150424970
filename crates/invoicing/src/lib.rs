//! Invoicing: persisted row shapes and the invoice issue pipeline.
//!
//! Deterministic domain logic only (no IO, no HTTP, no storage). The row types
//! here are the only contract between write-time generation and read-time
//! revenue reporting.

pub mod invoice;
pub mod issue;
pub mod schedule;

pub use invoice::{InvoiceId, InvoiceLineId, InvoiceLineRecord, InvoiceRecord, InvoiceStatus};
pub use issue::{IssueInvoice, IssuedInvoice, issue_invoice};
pub use schedule::{
    PaymentScheduleRow, PaymentStatus, RecurringScheduleRow, RecurringStatus, ScheduleRowId,
};
