use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use salesbook_core::{DomainError, DomainResult, next_due_date};
use salesbook_products::PaymentPlan;

use crate::cadence::check_projection;

/// One projected payment of a line. `installment_num == 0` is the down payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentScheduleEntry {
    pub installment_num: u32,
    pub due_at: DateTime<Utc>,
    pub amount_minor: u64,
    pub description: String,
}

/// Split a line total into an optional down payment and `num_installments`
/// installments.
///
/// The down payment is capped at the line total. Installments are the even
/// floor share of the remainder, and the last installment absorbs the
/// rounding difference, so the rows always sum to `line_total_minor`.
pub fn generate_payment_schedule(
    plan: &PaymentPlan,
    line_total_minor: u64,
    invoice_date: DateTime<Utc>,
) -> DomainResult<Vec<PaymentScheduleEntry>> {
    let n = plan.num_installments;
    if n == 0 {
        return Err(DomainError::validation(format!(
            "payment plan {} has no installments",
            plan.id
        )));
    }
    check_projection("installment", n, plan.interval_type, plan.interval_days)?;

    let down_payment = plan.down_payment_minor.min(line_total_minor);
    let remaining = line_total_minor - down_payment;
    let even = remaining / u64::from(n);
    let last = remaining - even * u64::from(n - 1);

    let mut entries = Vec::with_capacity(n as usize + 1);

    if down_payment > 0 {
        entries.push(PaymentScheduleEntry {
            installment_num: 0,
            due_at: invoice_date,
            amount_minor: down_payment,
            description: "Down payment".to_string(),
        });
    }

    for i in 1..=n {
        let due_at = next_due_date(invoice_date, i, plan.interval_type, plan.interval_days)?;
        entries.push(PaymentScheduleEntry {
            installment_num: i,
            due_at,
            amount_minor: if i == n { last } else { even },
            description: format!("Installment {i} of {n}"),
        });
    }

    tracing::debug!(
        plan_id = %plan.id,
        line_total_minor,
        down_payment,
        installments = n,
        "generated payment schedule"
    );

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use salesbook_core::{EntityId, IntervalType};
    use salesbook_products::PaymentPlanId;

    use crate::cadence::MAX_SCHEDULE_ROWS;

    fn test_plan(n: u32, interval: IntervalType) -> PaymentPlan {
        PaymentPlan::new(PaymentPlanId::new(EntityId::new()), n, interval)
    }

    fn invoice_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap()
    }

    fn sum(entries: &[PaymentScheduleEntry]) -> u64 {
        entries.iter().map(|e| e.amount_minor).sum()
    }

    #[test]
    fn three_even_installments_without_down_payment() {
        let plan = test_plan(3, IntervalType::Monthly);
        let entries = generate_payment_schedule(&plan, 10_000, invoice_date()).unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries.iter().map(|e| e.amount_minor).collect::<Vec<_>>(),
            vec![3333, 3333, 3334]
        );
        assert_eq!(sum(&entries), 10_000);
        assert_eq!(entries[0].installment_num, 1);
        assert_eq!(entries[2].description, "Installment 3 of 3");
    }

    #[test]
    fn down_payment_row_is_dated_at_invoice_date() {
        let plan = test_plan(2, IntervalType::Weekly).with_down_payment(1_000);
        let entries = generate_payment_schedule(&plan, 5_001, invoice_date()).unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].installment_num, 0);
        assert_eq!(entries[0].due_at, invoice_date());
        assert_eq!(entries[0].amount_minor, 1_000);
        assert_eq!(entries[1].amount_minor, 2_000);
        assert_eq!(entries[2].amount_minor, 2_001);
        assert_eq!(entries[1].due_at, invoice_date() + chrono::Duration::days(7));
        assert_eq!(sum(&entries), 5_001);
    }

    #[test]
    fn down_payment_is_capped_at_line_total() {
        let plan = test_plan(4, IntervalType::Monthly).with_down_payment(9_999);
        let entries = generate_payment_schedule(&plan, 500, invoice_date()).unwrap();

        assert_eq!(entries[0].amount_minor, 500);
        assert!(entries[1..].iter().all(|e| e.amount_minor == 0));
        assert_eq!(sum(&entries), 500);
    }

    #[test]
    fn installment_dates_follow_calendar_rollover() {
        let plan = test_plan(2, IntervalType::Monthly);
        let entries = generate_payment_schedule(&plan, 200, invoice_date()).unwrap();
        // Jan 31 2024 + 1 month -> Mar 2 (leap year); + 2 months -> Mar 31.
        assert_eq!(entries[0].due_at, Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap());
        assert_eq!(entries[1].due_at, Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap());
    }

    #[test]
    fn custom_day_plans_use_interval_days() {
        let plan = test_plan(2, IntervalType::CustomDays).with_interval_days(10);
        let entries = generate_payment_schedule(&plan, 100, invoice_date()).unwrap();
        assert_eq!(entries[1].due_at, invoice_date() + chrono::Duration::days(20));
    }

    #[test]
    fn oversized_plan_is_rejected_before_projecting() {
        let plan = test_plan(u32::MAX, IntervalType::Monthly);
        let err = generate_payment_schedule(&plan, 10_000, invoice_date()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("installment count")));

        let at_limit = test_plan(MAX_SCHEDULE_ROWS, IntervalType::Weekly);
        let entries = generate_payment_schedule(&at_limit, 10_000, invoice_date()).unwrap();
        assert_eq!(entries.len(), MAX_SCHEDULE_ROWS as usize);
    }

    #[test]
    fn zero_day_custom_plan_is_rejected() {
        let plan = test_plan(3, IntervalType::CustomDays).with_interval_days(0);
        let err = generate_payment_schedule(&plan, 100, invoice_date()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn zero_installments_is_rejected() {
        let plan = test_plan(0, IntervalType::Monthly);
        let err = generate_payment_schedule(&plan, 100, invoice_date()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: installments plus down payment always equal the line total.
        #[test]
        fn schedule_sums_to_line_total(
            total in 0u64..100_000_000u64,
            n in 1u32..60u32,
            down in 0u64..200_000_000u64,
        ) {
            let plan = test_plan(n, IntervalType::Monthly).with_down_payment(down);
            let entries = generate_payment_schedule(&plan, total, invoice_date()).unwrap();

            prop_assert_eq!(sum(&entries), total);
            let installments = entries.iter().filter(|e| e.installment_num > 0).count();
            prop_assert_eq!(installments, n as usize);
        }
    }
}
