//! `salesbook-core`: shared building blocks for the pricing and revenue engine.
//!
//! This crate contains **pure domain** primitives (no IO, no storage): errors,
//! identifiers, calendar arithmetic, minor-unit math and configuration.

pub mod calendar;
pub mod config;
pub mod error;
pub mod id;
pub mod money;

pub use calendar::{GroupBy, IntervalType, next_due_date, period_key};
pub use config::EngineConfig;
pub use error::{DomainError, DomainResult};
pub use id::{EntityId, OwnerId};
