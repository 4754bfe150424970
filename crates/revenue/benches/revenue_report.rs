use chrono::{Duration, TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use salesbook_core::{GroupBy, OwnerId};
use salesbook_invoicing::{
    InvoiceId, InvoiceLineId, InvoiceLineRecord, InvoiceRecord, InvoiceStatus, PaymentScheduleRow,
    PaymentStatus, ScheduleRowId,
};
use salesbook_products::ProductId;
use salesbook_revenue::{InMemoryRevenueStore, ReportQuery, RevenueAggregator};

/// `invoices` invoices of one line each; every other one is financed over
/// four rows, half of them paid.
fn seeded_store(owner: OwnerId, invoices: usize) -> InMemoryRevenueStore {
    let store = InMemoryRevenueStore::new();
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();

    for i in 0..invoices {
        let id = InvoiceId::generate();
        let created_at = start + Duration::hours(i as i64);
        let line = InvoiceLineRecord {
            id: InvoiceLineId::generate(),
            invoice_id: id,
            line_no: 1,
            product_id: ProductId::generate(),
            quantity: 1,
            unit_price_minor: 10_000,
            subtotal_minor: 10_000,
            discount_minor: 0,
            tax_minor: 0,
            total_minor: 10_000,
            cogs_minor: 3_000,
            margin_minor: 7_000,
            payment_plan_id: None,
            recurring_interval: None,
        };

        if i % 2 == 0 {
            store.insert_payment_rows((1..=4).map(|n| PaymentScheduleRow {
                id: ScheduleRowId::generate(),
                owner_id: owner,
                invoice_id: id,
                invoice_line_id: line.id,
                installment_num: n,
                due_at: created_at + Duration::days(30 * i64::from(n)),
                amount_minor: 2_500,
                description: String::new(),
                status: if n <= 2 { PaymentStatus::Paid } else { PaymentStatus::Pending },
                paid_at: None,
            }));
        }

        store.insert_invoice(InvoiceRecord {
            id,
            owner_id: owner,
            status: InvoiceStatus::Paid,
            amount_minor: 10_000,
            created_at,
            paid_at: Some(created_at),
            lines: vec![line],
        });
    }
    store
}

fn bench_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("revenue_report");

    for size in [100usize, 1_000, 10_000] {
        let owner = OwnerId::new();
        let aggregator = RevenueAggregator::new(seeded_store(owner, size));
        let query = ReportQuery {
            group_by: Some(GroupBy::Week),
            ..ReportQuery::default()
        };

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| aggregator.report(black_box(owner), black_box(&query)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_report);
criterion_main!(benches);
