//! Client Error Taxonomy
//!
//! One typed enum for everything the public API can fail with.
//! Port-level operations return `anyhow::Result` and are wrapped into
//! `ClientError::Network` at the facade boundary via `#[from]`.

use alloy::primitives::Address;
use thiserror::Error;

/// Errors surfaced by the client facade and its components.
///
/// Signer-address failures are deliberately NOT represented here: they
/// are recovered locally by degrading to read-only mode during `init`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Unrecognized backend kind, malformed URL/key/address, or a
    /// chain-id mismatch against the expected network. Fatal to `init`.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Registry lookup miss at the facade level. The registry itself
    /// returns `Option`; this variant is the caller-facing signal.
    #[error("no contract registered at {0}")]
    ContractNotFound(Address),

    /// A Ready-gated operation was invoked before a successful `init`.
    #[error("client is not initialized")]
    NotInitialized,

    /// A network query failed (fee data, gas price, chain id, eth_call).
    /// Propagated to the caller of `init`/`update_fee_data`; retry
    /// policy is the caller's responsibility.
    #[error("network query failed: {0}")]
    Network(#[from] anyhow::Error),
}
