//! Row sources for revenue reporting.
//!
//! The storage layer implements [`RevenueStore`]; every fetch is already
//! scoped to one owner. [`InMemoryRevenueStore`] backs tests and the CLI.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use salesbook_core::OwnerId;
use salesbook_invoicing::{InvoiceRecord, PaymentScheduleRow, RecurringScheduleRow};

use crate::lead::LeadRecord;

/// Upstream read failure. Never surfaced from a report: the affected source
/// degrades to empty instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// The fetch thread panicked before returning rows.
    #[error("fetch for {0:?} panicked")]
    Panicked(DataSource),
}

/// Which fetch a row set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Invoices,
    PaymentSchedules,
    RecurringSchedules,
    Leads,
}

/// Owner-scoped, read-only access to persisted rows.
pub trait RevenueStore: Send + Sync {
    fn invoices(&self, owner: OwnerId) -> Result<Vec<InvoiceRecord>, FetchError>;
    fn payment_schedule_rows(&self, owner: OwnerId) -> Result<Vec<PaymentScheduleRow>, FetchError>;
    fn recurring_schedule_rows(
        &self,
        owner: OwnerId,
    ) -> Result<Vec<RecurringScheduleRow>, FetchError>;
    fn leads(&self, owner: OwnerId) -> Result<Vec<LeadRecord>, FetchError>;
}

impl<S> RevenueStore for std::sync::Arc<S>
where
    S: RevenueStore + ?Sized,
{
    fn invoices(&self, owner: OwnerId) -> Result<Vec<InvoiceRecord>, FetchError> {
        (**self).invoices(owner)
    }

    fn payment_schedule_rows(&self, owner: OwnerId) -> Result<Vec<PaymentScheduleRow>, FetchError> {
        (**self).payment_schedule_rows(owner)
    }

    fn recurring_schedule_rows(
        &self,
        owner: OwnerId,
    ) -> Result<Vec<RecurringScheduleRow>, FetchError> {
        (**self).recurring_schedule_rows(owner)
    }

    fn leads(&self, owner: OwnerId) -> Result<Vec<LeadRecord>, FetchError> {
        (**self).leads(owner)
    }
}

/// Everything a store holds, in one serializable bundle (CLI input format).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSnapshot {
    #[serde(default)]
    pub invoices: Vec<InvoiceRecord>,
    #[serde(default)]
    pub payment_schedules: Vec<PaymentScheduleRow>,
    #[serde(default)]
    pub recurring_schedules: Vec<RecurringScheduleRow>,
    #[serde(default)]
    pub leads: Vec<LeadRecord>,
}

/// In-memory store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryRevenueStore {
    inner: RwLock<RowSnapshot>,
}

impl InMemoryRevenueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: RowSnapshot) -> Self {
        Self {
            inner: RwLock::new(snapshot),
        }
    }

    pub fn insert_invoice(&self, invoice: InvoiceRecord) {
        if let Ok(mut rows) = self.inner.write() {
            rows.invoices.push(invoice);
        }
    }

    pub fn insert_payment_rows(&self, new_rows: impl IntoIterator<Item = PaymentScheduleRow>) {
        if let Ok(mut rows) = self.inner.write() {
            rows.payment_schedules.extend(new_rows);
        }
    }

    pub fn insert_recurring_rows(&self, new_rows: impl IntoIterator<Item = RecurringScheduleRow>) {
        if let Ok(mut rows) = self.inner.write() {
            rows.recurring_schedules.extend(new_rows);
        }
    }

    pub fn insert_lead(&self, lead: LeadRecord) {
        if let Ok(mut rows) = self.inner.write() {
            rows.leads.push(lead);
        }
    }

    fn read<T: Clone>(
        &self,
        owner: OwnerId,
        select: impl Fn(&RowSnapshot) -> &Vec<T>,
        owner_of: impl Fn(&T) -> OwnerId,
    ) -> Result<Vec<T>, FetchError> {
        let rows = self
            .inner
            .read()
            .map_err(|_| FetchError::Unavailable("in-memory store lock poisoned".to_string()))?;
        Ok(select(&rows)
            .iter()
            .filter(|r| owner_of(*r) == owner)
            .cloned()
            .collect())
    }
}

impl RevenueStore for InMemoryRevenueStore {
    fn invoices(&self, owner: OwnerId) -> Result<Vec<InvoiceRecord>, FetchError> {
        self.read(owner, |s| &s.invoices, |r| r.owner_id)
    }

    fn payment_schedule_rows(&self, owner: OwnerId) -> Result<Vec<PaymentScheduleRow>, FetchError> {
        self.read(owner, |s| &s.payment_schedules, |r| r.owner_id)
    }

    fn recurring_schedule_rows(
        &self,
        owner: OwnerId,
    ) -> Result<Vec<RecurringScheduleRow>, FetchError> {
        self.read(owner, |s| &s.recurring_schedules, |r| r.owner_id)
    }

    fn leads(&self, owner: OwnerId) -> Result<Vec<LeadRecord>, FetchError> {
        self.read(owner, |s| &s.leads, |r| r.owner_id)
    }
}
