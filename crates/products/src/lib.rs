//! Catalog reference data: products and installment plans.
//!
//! Records here are immutable inputs to pricing and scheduling; catalog
//! management lives outside this engine.

pub mod plan;
pub mod product;

pub use plan::{PaymentPlan, PaymentPlanId};
pub use product::{AdjustmentKind, PriceAdjustment, Product, ProductId};
