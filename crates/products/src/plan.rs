use serde::{Deserialize, Serialize};

use salesbook_core::{IntervalType, entity_id};

entity_id!(
    /// Installment plan identifier.
    PaymentPlanId
);

/// Installment plan: an optional down payment followed by `num_installments`
/// payments spaced by `interval_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPlan {
    pub id: PaymentPlanId,
    #[serde(default)]
    pub name: String,
    pub num_installments: u32,
    pub interval_type: IntervalType,
    /// Cycle length for [`IntervalType::CustomDays`].
    #[serde(default)]
    pub interval_days: Option<u32>,
    #[serde(default)]
    pub down_payment_minor: u64,
}

impl PaymentPlan {
    pub fn new(id: PaymentPlanId, num_installments: u32, interval_type: IntervalType) -> Self {
        Self {
            id,
            name: String::new(),
            num_installments,
            interval_type,
            interval_days: None,
            down_payment_minor: 0,
        }
    }

    pub fn with_down_payment(mut self, down_payment_minor: u64) -> Self {
        self.down_payment_minor = down_payment_minor;
        self
    }

    pub fn with_interval_days(mut self, days: u32) -> Self {
        self.interval_days = Some(days);
        self
    }
}
