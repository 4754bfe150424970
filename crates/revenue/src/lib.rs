//! Read-time revenue reporting.
//!
//! Rows persisted by `salesbook-invoicing` are fetched per owner, classified
//! once into one-time, schedule-backed and recurring-backed entries, then
//! aggregated into realized/pending totals, prorated COGS and a period series.

pub mod aggregator;
pub mod classify;
pub mod lead;
pub mod proration;
pub mod query;
pub mod report;
pub mod store;

#[cfg(test)]
mod testing;

pub use aggregator::RevenueAggregator;
pub use classify::{Recognition, RevenueEntry, SourceKind, classify};
pub use lead::{LeadId, LeadRecord, LeadStatus};
pub use proration::prorated_cogs;
pub use query::{DateRange, ReportQuery};
pub use report::{
    RevenuePoint, RevenueReport, SourceBreakdown, SourceTotals, gross_margin, margin_percent,
};
pub use store::{DataSource, FetchError, InMemoryRevenueStore, RevenueStore, RowSnapshot};
