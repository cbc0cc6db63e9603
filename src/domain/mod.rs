//! Domain layer - Core fee-pricing data model.
//!
//! Pure types only: no network I/O, no provider handles. Everything
//! here is constructible and testable in isolation.

pub mod fees;

pub use fees::{FeeOverrides, TxFeeOptions, DEFAULT_GAS_LIMIT};
