use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use salesbook_core::money::{self, BP_SCALE};
use salesbook_core::{DomainError, DomainResult};
use salesbook_products::{AdjustmentKind, PaymentPlanId, PriceAdjustment, Product, ProductId};

/// One requested invoice line, as validated by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemInput {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default)]
    pub unit_price_override_minor: Option<u64>,
    #[serde(default)]
    pub discount_type: Option<AdjustmentKind>,
    #[serde(default)]
    pub discount_value: Option<u64>,
    #[serde(default)]
    pub payment_plan_id: Option<PaymentPlanId>,
    /// Caps the number of recurring billing cycles for recurring products.
    #[serde(default)]
    pub recurring_cycles: Option<u32>,
}

impl LineItemInput {
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
            unit_price_override_minor: None,
            discount_type: None,
            discount_value: None,
            payment_plan_id: None,
            recurring_cycles: None,
        }
    }

    /// Line-level discount; only a positive value overrides the product's own.
    pub fn discount_override(&self) -> DomainResult<Option<PriceAdjustment>> {
        match (self.discount_type, self.discount_value) {
            (_, None) | (_, Some(0)) => Ok(None),
            (Some(kind), Some(value)) => Ok(Some(PriceAdjustment { kind, value })),
            (None, Some(_)) => Err(DomainError::validation(
                "discount_value given without discount_type",
            )),
        }
    }
}

/// Frozen pricing of one invoice line. Persisted as-is; never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatedLineItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price_minor: u64,
    pub subtotal_minor: u64,
    pub discount_minor: u64,
    pub tax_minor: u64,
    pub total_minor: u64,
    pub cogs_minor: u64,
    /// `total - cogs`; negative for a loss-making line.
    pub margin_minor: i64,
    pub payment_plan_id: Option<PaymentPlanId>,
}

/// Invoice-level aggregate over all calculated lines.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InvoiceCalculation {
    pub lines: Vec<CalculatedLineItem>,
    pub subtotal_minor: u64,
    pub discount_minor: u64,
    pub tax_minor: u64,
    pub total_minor: u64,
    pub cogs_minor: u64,
    pub margin_minor: i64,
}

/// Price a single line.
///
/// Steps, each floored in integer minor units:
/// 1. `subtotal = unit_price * quantity` (override wins over list price)
/// 2. discount from the override, else the product's own discount
/// 3. `tax = (subtotal - discount) * tax_rate_bp / 10000`
/// 4. COGS from the product: percent of the *pre-discount* subtotal, or a
///    flat amount per unit
/// 5. `margin = total - cogs`, not clamped
///
/// A flat discount is applied once per line while a flat COGS is multiplied
/// by quantity. Both behaviors are relied on by existing invoices.
pub fn calculate_line_item(
    product: &Product,
    quantity: u32,
    unit_price_override_minor: Option<u64>,
    discount_override: Option<PriceAdjustment>,
) -> DomainResult<CalculatedLineItem> {
    if quantity == 0 {
        return Err(DomainError::validation("line quantity must be positive"));
    }
    let qty = u64::from(quantity);

    let unit_price = unit_price_override_minor.unwrap_or(product.price_minor);
    let subtotal = money::checked_mul(unit_price, qty, "line subtotal")?;

    let discount = match discount_override
        .filter(|d| d.value > 0)
        .or(product.discount)
    {
        Some(d) => discount_amount(d, subtotal)?,
        None => 0,
    };
    let after_discount = subtotal - discount;

    let tax = money::apply_bp(after_discount, product.tax_rate_bp)?;
    let total = money::checked_add(after_discount, tax, "line total")?;

    let cogs = match product.cogs {
        Some(c) => match c.kind {
            AdjustmentKind::Percent => money::apply_bp(subtotal, bp(c.value)?)?,
            AdjustmentKind::Amount => money::checked_mul(c.value, qty, "line cogs")?,
        },
        None => 0,
    };

    let margin = i64::try_from(i128::from(total) - i128::from(cogs))
        .map_err(|_| DomainError::invariant("line margin overflow"))?;

    tracing::debug!(
        product_id = %product.id,
        quantity,
        subtotal,
        discount,
        tax,
        total,
        cogs,
        margin,
        "priced line item"
    );

    Ok(CalculatedLineItem {
        product_id: product.id,
        quantity,
        unit_price_minor: unit_price,
        subtotal_minor: subtotal,
        discount_minor: discount,
        tax_minor: tax,
        total_minor: total,
        cogs_minor: cogs,
        margin_minor: margin,
        payment_plan_id: None,
    })
}

fn discount_amount(discount: PriceAdjustment, subtotal: u64) -> DomainResult<u64> {
    match discount.kind {
        AdjustmentKind::Percent => {
            if discount.value > BP_SCALE {
                return Err(DomainError::validation(format!(
                    "percent discount of {} bp exceeds 100%",
                    discount.value
                )));
            }
            money::apply_bp(subtotal, bp(discount.value)?)
        }
        AdjustmentKind::Amount => {
            if discount.value > subtotal {
                return Err(DomainError::validation(format!(
                    "amount discount {} exceeds line subtotal {}",
                    discount.value, subtotal
                )));
            }
            Ok(discount.value)
        }
    }
}

fn bp(value: u64) -> DomainResult<u32> {
    u32::try_from(value).map_err(|_| DomainError::validation("basis point value out of range"))
}

/// Price every requested line and sum the invoice totals.
///
/// A line referencing an unknown product aborts the whole invoice.
pub fn calculate_invoice(
    products: &[Product],
    inputs: &[LineItemInput],
) -> DomainResult<InvoiceCalculation> {
    if inputs.is_empty() {
        return Err(DomainError::validation("cannot price an invoice without lines"));
    }

    let catalog: HashMap<ProductId, &Product> = products.iter().map(|p| (p.id, p)).collect();
    let mut calc = InvoiceCalculation::default();

    for input in inputs {
        let product = catalog.get(&input.product_id).ok_or_else(|| {
            DomainError::validation(format!("product {} not found", input.product_id))
        })?;

        let mut line = calculate_line_item(
            product,
            input.quantity,
            input.unit_price_override_minor,
            input.discount_override()?,
        )?;
        line.payment_plan_id = input.payment_plan_id;

        calc.subtotal_minor = money::checked_add(calc.subtotal_minor, line.subtotal_minor, "invoice subtotal")?;
        calc.discount_minor = money::checked_add(calc.discount_minor, line.discount_minor, "invoice discount")?;
        calc.tax_minor = money::checked_add(calc.tax_minor, line.tax_minor, "invoice tax")?;
        calc.total_minor = money::checked_add(calc.total_minor, line.total_minor, "invoice total")?;
        calc.cogs_minor = money::checked_add(calc.cogs_minor, line.cogs_minor, "invoice cogs")?;
        calc.margin_minor = calc
            .margin_minor
            .checked_add(line.margin_minor)
            .ok_or_else(|| DomainError::invariant("invoice margin overflow"))?;

        calc.lines.push(line);
    }

    Ok(calc)
}
