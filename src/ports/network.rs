//! Network Handle Port - Chain Backend Capability
//!
//! Defines the trait for querying a connected network backend: fee
//! data, gas price, unlocked accounts, raw contract reads. The fee
//! resolver and the contract registry consume this trait; the alloy
//! adapter implements it.

use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;

/// Snapshot of the network's current fee market, as reported by the
/// backend. Any field may be absent: legacy chains report no dynamic
/// fields, and some nodes omit the gas price from the snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeData {
    /// Legacy gas price in wei.
    pub gas_price: Option<u128>,
    /// EIP-1559 max fee per gas in wei.
    pub max_fee_per_gas: Option<u128>,
    /// EIP-1559 max priority fee per gas in wei.
    pub max_priority_fee_per_gas: Option<u128>,
}

impl FeeData {
    /// Whether the snapshot carries a complete dynamic fee market.
    /// A snapshot with only one of the two dynamic fields does not.
    pub fn supports_eip1559(&self) -> bool {
        self.max_fee_per_gas.is_some() && self.max_priority_fee_per_gas.is_some()
    }
}

/// Trait for read/query access to a connected chain backend.
///
/// All methods suspend on network I/O; none mutate chain state.
/// Implementations are shared behind `Arc<dyn NetworkHandle>` across
/// the fee resolver, registry handles, and batch sessions.
#[async_trait]
pub trait NetworkHandle: Send + Sync + 'static {
    /// Get the chain identifier of the connected network.
    async fn chain_id(&self) -> anyhow::Result<u64>;

    /// Get the current fee-market snapshot.
    async fn fee_data(&self) -> anyhow::Result<FeeData>;

    /// Query the current gas price in wei. This is a distinct
    /// on-demand call, not the cached `fee_data` snapshot.
    async fn gas_price(&self) -> anyhow::Result<u128>;

    /// List the backend's unlocked accounts, default account first.
    /// May be empty for read-only endpoints.
    async fn accounts(&self) -> anyhow::Result<Vec<Address>>;

    /// Execute a read-only contract call (`eth_call`).
    async fn call(&self, to: Address, data: Bytes) -> anyhow::Result<Bytes>;

    /// Get the deployed bytecode at an address (empty if none).
    async fn code_at(&self, address: Address) -> anyhow::Result<Bytes>;
}
