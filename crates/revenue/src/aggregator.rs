use std::thread::{self, ScopedJoinHandle};

use salesbook_core::money::checked_add;
use salesbook_core::{DomainResult, EngineConfig, GroupBy, OwnerId};
use salesbook_invoicing::InvoiceStatus;

use crate::classify::{SourceKind, classify};
use crate::query::{DateRange, ReportQuery};
use crate::report::{RevenueReport, SourceTotals};
use crate::store::{DataSource, FetchError, RevenueStore, RowSnapshot};

/// Read-time revenue reporting over a [`RevenueStore`].
pub struct RevenueAggregator<S> {
    store: S,
    default_group_by: GroupBy,
}

impl<S: RevenueStore> RevenueAggregator<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            default_group_by: GroupBy::default(),
        }
    }

    pub fn with_config(store: S, config: &EngineConfig) -> Self {
        Self {
            store,
            default_group_by: config.default_group_by,
        }
    }

    /// Build the owner's revenue report for the queried window.
    ///
    /// Only a malformed query or an arithmetic overflow fails the report. A
    /// source that cannot be fetched is reported as empty and listed in
    /// `degraded_sources`.
    pub fn report(&self, owner: OwnerId, query: &ReportQuery) -> DomainResult<RevenueReport> {
        let range = DateRange::parse(query.from.as_deref(), query.to.as_deref())?;
        let group_by = query.group_by.unwrap_or(self.default_group_by);

        let (rows, degraded) = self.fetch(owner);
        let entries = classify(&rows, &degraded);

        let mut partials: [SourceTotals; 3] = Default::default();
        for entry in entries.iter().filter(|e| range.contains(e.recognition().at())) {
            let slot = match entry.source() {
                SourceKind::OneTimeInvoices => &mut partials[0],
                SourceKind::PaymentSchedules => &mut partials[1],
                SourceKind::RecurringRevenue => &mut partials[2],
            };
            slot.record(entry, group_by)?;
        }
        for (kind, partial) in SourceKind::ALL.iter().zip(&partials) {
            tracing::debug!(
                source = ?kind,
                realized_minor = partial.realized.get(*kind),
                pending_minor = partial.pending.get(*kind),
                "source totals"
            );
        }
        let totals = partials
            .into_iter()
            .try_fold(SourceTotals::default(), SourceTotals::merge)?;

        let draft_total_minor = rows
            .invoices
            .iter()
            .filter(|inv| inv.status == InvoiceStatus::Draft && range.contains(inv.created_at))
            .try_fold(0, |acc, inv| checked_add(acc, inv.amount_minor, "draft total"))?;
        let lead_potential_minor = rows
            .leads
            .iter()
            .filter(|lead| lead.status.is_open())
            .try_fold(0, |acc, lead| checked_add(acc, lead.value_minor, "lead potential"))?;

        let report =
            RevenueReport::build(totals, draft_total_minor, lead_potential_minor, degraded)?;

        tracing::info!(
            owner_id = %owner,
            group_by = ?group_by,
            realized_total_minor = report.realized_total_minor,
            pending_total_minor = report.pending_total_minor,
            gross_margin_bp = report.gross_margin_bp,
            periods = report.revenue.len(),
            degraded = report.degraded_sources.len(),
            "generated revenue report"
        );
        Ok(report)
    }

    /// Fetch all sources concurrently; failures degrade to empty.
    fn fetch(&self, owner: OwnerId) -> (RowSnapshot, Vec<DataSource>) {
        let store = &self.store;
        let (invoices, payments, recurring, leads) = thread::scope(|s| {
            let invoices = s.spawn(move || store.invoices(owner));
            let payments = s.spawn(move || store.payment_schedule_rows(owner));
            let recurring = s.spawn(move || store.recurring_schedule_rows(owner));
            let leads = s.spawn(move || store.leads(owner));
            (
                join(DataSource::Invoices, invoices),
                join(DataSource::PaymentSchedules, payments),
                join(DataSource::RecurringSchedules, recurring),
                join(DataSource::Leads, leads),
            )
        });

        let mut degraded = Vec::new();
        let rows = RowSnapshot {
            invoices: settle(DataSource::Invoices, invoices, &mut degraded),
            payment_schedules: settle(DataSource::PaymentSchedules, payments, &mut degraded),
            recurring_schedules: settle(DataSource::RecurringSchedules, recurring, &mut degraded),
            leads: settle(DataSource::Leads, leads, &mut degraded),
        };
        (rows, degraded)
    }
}

fn join<T>(
    source: DataSource,
    handle: ScopedJoinHandle<'_, Result<T, FetchError>>,
) -> Result<T, FetchError> {
    handle
        .join()
        .unwrap_or_else(|_| Err(FetchError::Panicked(source)))
}

fn settle<T>(
    source: DataSource,
    fetched: Result<Vec<T>, FetchError>,
    degraded: &mut Vec<DataSource>,
) -> Vec<T> {
    match fetched {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!(source = ?source, error = %err, "revenue source degraded to empty");
            degraded.push(source);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lead::{LeadId, LeadRecord, LeadStatus};
    use crate::store::InMemoryRevenueStore;
    use crate::testing::*;
    use salesbook_core::IntervalType;
    use salesbook_invoicing::{PaymentStatus, RecurringStatus};
    use salesbook_products::PaymentPlanId;

    fn query(from: &str, to: &str) -> ReportQuery {
        ReportQuery {
            from: Some(from.to_string()),
            to: Some(to.to_string()),
            group_by: None,
        }
    }

    /// Store whose payment schedule fetch always fails.
    struct FlakySchedules(InMemoryRevenueStore);

    impl RevenueStore for FlakySchedules {
        fn invoices(&self, owner: OwnerId) -> Result<Vec<salesbook_invoicing::InvoiceRecord>, FetchError> {
            self.0.invoices(owner)
        }

        fn payment_schedule_rows(
            &self,
            _owner: OwnerId,
        ) -> Result<Vec<salesbook_invoicing::PaymentScheduleRow>, FetchError> {
            Err(FetchError::Unavailable("connection reset".to_string()))
        }

        fn recurring_schedule_rows(
            &self,
            owner: OwnerId,
        ) -> Result<Vec<salesbook_invoicing::RecurringScheduleRow>, FetchError> {
            self.0.recurring_schedule_rows(owner)
        }

        fn leads(&self, owner: OwnerId) -> Result<Vec<LeadRecord>, FetchError> {
            self.0.leads(owner)
        }
    }

    /// Store whose invoice fetch panics mid-read.
    struct PanickingInvoices(InMemoryRevenueStore);

    impl RevenueStore for PanickingInvoices {
        fn invoices(&self, _owner: OwnerId) -> Result<Vec<salesbook_invoicing::InvoiceRecord>, FetchError> {
            panic!("invoice cursor dropped");
        }

        fn payment_schedule_rows(
            &self,
            owner: OwnerId,
        ) -> Result<Vec<salesbook_invoicing::PaymentScheduleRow>, FetchError> {
            self.0.payment_schedule_rows(owner)
        }

        fn recurring_schedule_rows(
            &self,
            owner: OwnerId,
        ) -> Result<Vec<salesbook_invoicing::RecurringScheduleRow>, FetchError> {
            self.0.recurring_schedule_rows(owner)
        }

        fn leads(&self, owner: OwnerId) -> Result<Vec<LeadRecord>, FetchError> {
            self.0.leads(owner)
        }
    }

    #[test]
    fn mixed_sources_are_counted_once_with_prorated_cogs() {
        let owner = OwnerId::new();
        let store = InMemoryRevenueStore::new();

        // Financed line: 1000 total, 400 cogs; half paid in Jan, half pending in Feb.
        let financed = invoice(owner, InvoiceStatus::Paid, ts(2024, 1, 2), vec![(1_000, 400)]);
        store.insert_payment_rows([
            payment_row(owner, &financed.lines[0], 500, ts(2024, 1, 15), PaymentStatus::Paid),
            payment_row(owner, &financed.lines[0], 500, ts(2024, 2, 15), PaymentStatus::Pending),
        ]);
        store.insert_invoice(financed);

        // One-time sale: 300 total, 100 cogs.
        let mut sale = invoice(owner, InvoiceStatus::Paid, ts(2024, 1, 3), vec![(300, 100)]);
        sale.paid_at = Some(ts(2024, 1, 20));
        store.insert_invoice(sale);

        // Subscription: 200/month, 50 cogs; one billed, one scheduled.
        let mut sub = invoice(owner, InvoiceStatus::Sent, ts(2024, 1, 1), vec![(200, 50)]);
        sub.lines[0].recurring_interval = Some(IntervalType::Monthly);
        store.insert_recurring_rows([
            recurring_row(owner, &sub.lines[0], 200, ts(2024, 2, 1), RecurringStatus::Billed),
            recurring_row(owner, &sub.lines[0], 200, ts(2024, 3, 1), RecurringStatus::Scheduled),
        ]);
        store.insert_invoice(sub);

        store.insert_invoice(invoice(owner, InvoiceStatus::Draft, ts(2024, 1, 10), vec![(999, 0)]));
        store.insert_lead(LeadRecord {
            id: LeadId::generate(),
            owner_id: owner,
            value_minor: 5_000,
            status: LeadStatus::Qualified,
        });
        store.insert_lead(LeadRecord {
            id: LeadId::generate(),
            owner_id: owner,
            value_minor: 7_000,
            status: LeadStatus::Converted,
        });

        let report = RevenueAggregator::new(store)
            .report(owner, &query("2024-01-01", "2024-03-31"))
            .unwrap();

        assert_eq!(report.realized_by_source.one_time_invoices, 300);
        assert_eq!(report.realized_by_source.payment_schedules, 500);
        assert_eq!(report.realized_by_source.recurring_revenue, 200);
        assert_eq!(report.realized_total_minor, 1_000);
        assert_eq!(report.pending_total_minor, 700);
        assert_eq!(report.draft_total_minor, 999);
        assert_eq!(report.lead_potential_minor, 5_000);

        // 200 (half of 400) + 100 + 50
        assert_eq!(report.realized_cogs_minor, 350);
        assert_eq!(report.gross_profit_minor, 650);
        assert_eq!(report.gross_margin_bp, 6_500);
        assert_eq!(report.gross_margin_percent, 65.0);

        let periods: Vec<_> = report.revenue.iter().map(|p| p.period.as_str()).collect();
        assert_eq!(periods, ["2024-01", "2024-02"]);
        assert_eq!(report.revenue[0].total_revenue_minor, 800);
        assert_eq!(report.revenue[1].sources.recurring_revenue, 200);
        assert!(report.degraded_sources.is_empty());
    }

    #[test]
    fn range_filters_by_recognition_timestamp() {
        let owner = OwnerId::new();
        let store = InMemoryRevenueStore::new();
        let inv = invoice(owner, InvoiceStatus::Sent, ts(2023, 12, 1), vec![(900, 0)]);
        store.insert_payment_rows([
            payment_row(owner, &inv.lines[0], 300, ts(2023, 12, 20), PaymentStatus::Paid),
            payment_row(owner, &inv.lines[0], 300, ts(2024, 1, 20), PaymentStatus::Overdue),
            payment_row(owner, &inv.lines[0], 300, ts(2024, 2, 20), PaymentStatus::Pending),
        ]);
        store.insert_invoice(inv);

        let report = RevenueAggregator::new(store)
            .report(owner, &query("2024-01-01", "2024-01-31"))
            .unwrap();
        assert_eq!(report.realized_total_minor, 0);
        assert_eq!(report.pending_total_minor, 300);
        assert_eq!(report.gross_margin_percent, 0.0);
    }

    #[test]
    fn failed_fetch_degrades_instead_of_failing() {
        let owner = OwnerId::new();
        let inner = InMemoryRevenueStore::new();
        let mut financed = invoice(owner, InvoiceStatus::Paid, ts(2024, 1, 2), vec![(1_000, 0)]);
        financed.lines[0].payment_plan_id = Some(PaymentPlanId::generate());
        inner.insert_invoice(financed);
        inner.insert_invoice(invoice(owner, InvoiceStatus::Paid, ts(2024, 1, 3), vec![(250, 0)]));

        let report = RevenueAggregator::new(FlakySchedules(inner))
            .report(owner, &ReportQuery::default())
            .unwrap();

        assert_eq!(report.degraded_sources, vec![DataSource::PaymentSchedules]);
        // The financed invoice stays out of one-time revenue.
        assert_eq!(report.realized_total_minor, 250);
    }

    #[test]
    fn panicking_invoice_fetch_degrades_only_invoices() {
        let owner = OwnerId::new();
        let inner = InMemoryRevenueStore::new();
        let inv = invoice(owner, InvoiceStatus::Paid, ts(2024, 1, 2), vec![(1_000, 400)]);
        inner.insert_payment_rows([
            payment_row(owner, &inv.lines[0], 600, ts(2024, 1, 15), PaymentStatus::Paid),
            payment_row(owner, &inv.lines[0], 400, ts(2024, 2, 15), PaymentStatus::Pending),
        ]);
        inner.insert_invoice(inv);
        inner.insert_lead(LeadRecord {
            id: LeadId::generate(),
            owner_id: owner,
            value_minor: 900,
            status: LeadStatus::Proposal,
        });

        let report = RevenueAggregator::new(PanickingInvoices(inner))
            .report(owner, &ReportQuery::default())
            .unwrap();

        assert_eq!(report.degraded_sources, vec![DataSource::Invoices]);
        assert_eq!(report.realized_by_source.payment_schedules, 600);
        assert_eq!(report.pending_total_minor, 400);
        assert_eq!(report.lead_potential_minor, 900);
        assert_eq!(report.draft_total_minor, 0);
        // Without the invoice lines there is nothing to prorate against.
        assert_eq!(report.realized_cogs_minor, 0);
    }

    #[test]
    fn join_maps_a_panic_to_its_source() {
        let fetched = thread::scope(|s| {
            let handle = s.spawn(|| -> Result<Vec<LeadRecord>, FetchError> {
                panic!("lead fetch blew up")
            });
            join(DataSource::Leads, handle)
        });
        assert_eq!(fetched, Err(FetchError::Panicked(DataSource::Leads)));
    }

    #[test]
    fn other_owners_rows_are_invisible() {
        let owner = OwnerId::new();
        let store = InMemoryRevenueStore::new();
        store.insert_invoice(invoice(OwnerId::new(), InvoiceStatus::Paid, ts(2024, 1, 3), vec![(250, 0)]));

        let report = RevenueAggregator::new(store).report(owner, &ReportQuery::default()).unwrap();
        assert_eq!(report.realized_total_minor, 0);
    }

    #[test]
    fn group_by_falls_back_to_configured_default() {
        let owner = OwnerId::new();
        let store = InMemoryRevenueStore::new();
        store.insert_invoice(invoice(owner, InvoiceStatus::Paid, ts(2024, 1, 3), vec![(250, 0)]));
        let config = EngineConfig {
            default_group_by: GroupBy::Day,
            ..EngineConfig::default()
        };
        let aggregator = RevenueAggregator::with_config(store, &config);

        let report = aggregator.report(owner, &ReportQuery::default()).unwrap();
        assert_eq!(report.revenue[0].period, "2024-01-03");

        let weekly = ReportQuery {
            group_by: Some(GroupBy::Week),
            ..ReportQuery::default()
        };
        let report = aggregator.report(owner, &weekly).unwrap();
        assert_eq!(report.revenue[0].period, "2024-W01");
    }

    #[test]
    fn malformed_query_is_a_validation_error() {
        let err = RevenueAggregator::new(InMemoryRevenueStore::new())
            .report(OwnerId::new(), &query("yesterday", "2024-01-01"))
            .unwrap_err();
        assert!(err.is_validation());
    }
}
