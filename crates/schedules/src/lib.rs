//! Time-phased projections of an invoice line.
//!
//! - [`payment`]: down payment plus installments under a payment plan
//! - [`recurring`]: future billing cycles of a recurring product
//!
//! Both are pure functions over in-memory inputs. Persistence shapes (and the
//! row statuses an external payment processor flips later) live in
//! `salesbook-invoicing`.

pub mod cadence;
pub mod payment;
pub mod recurring;

pub use cadence::MAX_SCHEDULE_ROWS;
pub use payment::{PaymentScheduleEntry, generate_payment_schedule};
pub use recurring::{RecurringScheduleEntry, cycles_in_horizon, generate_recurring_schedule};
