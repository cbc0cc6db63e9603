//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies.
//!
//! Adapter categories:
//! - `chain`: network backend access via alloy-rs

pub mod chain;
