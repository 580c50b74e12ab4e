//! Core building blocks for Pantry.
//!
//! This crate defines the pieces the kitchen model is composed from:
//!
//! - [`Measurement`] — an immutable, unit-checked, non-negative decimal quantity
//! - [`pubsub`] — an order-preserving publish/subscribe core with a
//!   notification cycle guard, expressed over an arena of node handles

mod measurement;

pub mod pubsub;

pub use measurement::{Measurement, MeasurementError, Unit};
pub use rust_decimal::Decimal;
