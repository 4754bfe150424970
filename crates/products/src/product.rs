use serde::{Deserialize, Serialize};

use salesbook_core::{IntervalType, entity_id};

entity_id!(
    /// Catalog product identifier.
    ProductId
);

/// How a discount or cost-of-goods value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentKind {
    /// Value is in basis points of the (pre-discount) subtotal.
    Percent,
    /// Value is a flat amount in minor units.
    Amount,
}

/// A typed discount or cost value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceAdjustment {
    pub kind: AdjustmentKind,
    pub value: u64,
}

impl PriceAdjustment {
    pub fn percent_bp(value: u64) -> Self {
        Self {
            kind: AdjustmentKind::Percent,
            value,
        }
    }

    pub fn amount(value: u64) -> Self {
        Self {
            kind: AdjustmentKind::Amount,
            value,
        }
    }
}

/// Catalog product (immutable reference data, managed outside this engine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ProductRecord", into = "ProductRecord")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// List price in smallest currency unit (e.g., cents).
    pub price_minor: u64,
    pub tax_rate_bp: u32,
    pub cogs: Option<PriceAdjustment>,
    pub discount: Option<PriceAdjustment>,
    /// `None` marks a one-time product.
    pub recurring_interval: Option<IntervalType>,
    /// Cycle length for [`IntervalType::CustomDays`].
    pub recurring_interval_days: Option<u32>,
    pub currency: String,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, price_minor: u64, tax_rate_bp: u32) -> Self {
        Self {
            id,
            name: name.into(),
            price_minor,
            tax_rate_bp,
            cogs: None,
            discount: None,
            recurring_interval: None,
            recurring_interval_days: None,
            currency: "USD".to_string(),
        }
    }

    pub fn with_cogs(mut self, cogs: PriceAdjustment) -> Self {
        self.cogs = Some(cogs);
        self
    }

    pub fn with_discount(mut self, discount: PriceAdjustment) -> Self {
        self.discount = Some(discount);
        self
    }

    pub fn with_recurring(mut self, interval: IntervalType, days: Option<u32>) -> Self {
        self.recurring_interval = Some(interval);
        self.recurring_interval_days = days;
        self
    }

    pub fn is_recurring(&self) -> bool {
        self.recurring_interval.is_some()
    }
}

/// Storage shape: adjustments are two nullable columns each.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProductRecord {
    id: ProductId,
    #[serde(default)]
    name: String,
    price_minor: u64,
    #[serde(default)]
    tax_rate_bp: u32,
    #[serde(default)]
    cogs_type: Option<AdjustmentKind>,
    #[serde(default)]
    cogs_value: Option<u64>,
    #[serde(default)]
    discount_type: Option<AdjustmentKind>,
    #[serde(default)]
    discount_value: Option<u64>,
    #[serde(default)]
    recurring_interval: Option<IntervalType>,
    #[serde(default)]
    recurring_interval_days: Option<u32>,
    #[serde(default = "default_currency")]
    currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

// A type without a value reads as zero; a value without a type is ignored.
fn adjustment(kind: Option<AdjustmentKind>, value: Option<u64>) -> Option<PriceAdjustment> {
    kind.map(|kind| PriceAdjustment {
        kind,
        value: value.unwrap_or(0),
    })
}

impl From<ProductRecord> for Product {
    fn from(r: ProductRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            price_minor: r.price_minor,
            tax_rate_bp: r.tax_rate_bp,
            cogs: adjustment(r.cogs_type, r.cogs_value),
            discount: adjustment(r.discount_type, r.discount_value),
            recurring_interval: r.recurring_interval,
            recurring_interval_days: r.recurring_interval_days,
            currency: r.currency,
        }
    }
}

impl From<Product> for ProductRecord {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            price_minor: p.price_minor,
            tax_rate_bp: p.tax_rate_bp,
            cogs_type: p.cogs.map(|c| c.kind),
            cogs_value: p.cogs.map(|c| c.value),
            discount_type: p.discount.map(|d| d.kind),
            discount_value: p.discount.map(|d| d.value),
            recurring_interval: p.recurring_interval,
            recurring_interval_days: p.recurring_interval_days,
            currency: p.currency,
        }
    }
}
