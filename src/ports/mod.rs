//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the client core requires from
//! the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `NetworkHandle`: read/query access to a connected chain backend

pub mod network;
