//! crvUSD Client — Library Root
//!
//! Client-side initialization layer for the crvUSD protocol contracts:
//! backend selection, fee-pricing resolution, and the dual-handle
//! contract registry.

pub mod adapters;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod usecases;

pub use adapters::chain::{
    BackendConfig, BackendKind, BatchReader, BatchSession, Connection, ContractPair,
    ContractRegistry, SignerIdentity, MULTICALL3,
};
pub use client::{CrvusdClient, InitOptions};
pub use config::{MintMarket, ProtocolAbis, ProtocolConfig, ProtocolConstants};
pub use domain::fees::{FeeOverrides, TxFeeOptions, DEFAULT_GAS_LIMIT};
pub use error::ClientError;
pub use ports::network::{FeeData, NetworkHandle};
