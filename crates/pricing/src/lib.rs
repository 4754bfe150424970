//! Line and invoice pricing in integer minor units.
//!
//! Pure functions only: no IO, no shared state. Safe to call from any thread.

pub mod calculator;

pub use calculator::{
    CalculatedLineItem, InvoiceCalculation, LineItemInput, calculate_invoice, calculate_line_item,
};
