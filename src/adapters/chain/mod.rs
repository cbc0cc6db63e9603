//! Chain Adapters - Network Backend Interaction Layer
//!
//! Provides on-chain access via alloy-rs 0.9 for:
//! - backend selection and RPC provider management
//! - dual-handle contract bindings (direct + batchable)
//! - batched reads through the canonical Multicall3 deployment

pub mod contracts;
pub mod multicall;
pub mod provider;

pub use contracts::{BatchContract, ContractHandle, ContractPair, ContractRegistry, PreparedCall};
pub use multicall::{BatchReader, BatchSession, MULTICALL3};
pub use provider::{connect, BackendConfig, BackendKind, Connection, RpcNetwork, SignerIdentity};
