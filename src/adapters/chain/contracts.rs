//! Contract Registry - Dual-Handle Contract Bindings
//!
//! Maps each protocol contract address to one record holding two
//! handles built together from the same (address, ABI, connection)
//! triple: a direct handle that issues an `eth_call` per invocation,
//! and a batchable handle that contributes calls to a multicall
//! session. Keeping both in a single record means they cannot drift
//! apart across re-registrations.
//!
//! ABIs are dynamic interface descriptions (`JsonAbi`), so the
//! registry works for any injected contract, not a fixed set of
//! `sol!`-typed bindings.

use std::collections::HashMap;
use std::sync::Arc;

use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy::json_abi::{Function, JsonAbi};
use alloy::primitives::{Address, Bytes};
use anyhow::{anyhow, Context, Result};
use tracing::debug;

use crate::ports::network::NetworkHandle;

/// A contract binding that issues one network round-trip per call.
pub struct ContractHandle {
    address: Address,
    abi: Arc<JsonAbi>,
    handle: Arc<dyn NetworkHandle>,
}

impl ContractHandle {
    fn new(address: Address, abi: Arc<JsonAbi>, handle: Arc<dyn NetworkHandle>) -> Self {
        Self {
            address,
            abi,
            handle,
        }
    }

    /// The bound contract address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The bound interface description.
    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Invoke a read-only contract function and decode its outputs.
    ///
    /// Overloaded names resolve to the first declaration in the ABI.
    pub async fn call(&self, function: &str, args: &[DynSolValue]) -> Result<Vec<DynSolValue>> {
        let function = resolve_function(&self.abi, self.address, function)?;
        let calldata = function
            .abi_encode_input(args)
            .with_context(|| format!("failed to encode {} input", function.name))?;
        let raw = self.handle.call(self.address, calldata.into()).await?;
        function
            .abi_decode_output(&raw, true)
            .with_context(|| format!("failed to decode {} output", function.name))
    }
}

/// A contract binding usable inside a batched read session.
///
/// Produces encoded calls instead of executing them; the session
/// aggregates every prepared call into a single round-trip.
pub struct BatchContract {
    address: Address,
    abi: Arc<JsonAbi>,
}

impl BatchContract {
    fn new(address: Address, abi: Arc<JsonAbi>) -> Self {
        Self { address, abi }
    }

    /// The bound contract address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Encode a call for later aggregation.
    pub fn prepare(&self, function: &str, args: &[DynSolValue]) -> Result<PreparedCall> {
        let function = resolve_function(&self.abi, self.address, function)?;
        let calldata = function
            .abi_encode_input(args)
            .with_context(|| format!("failed to encode {} input", function.name))?;
        Ok(PreparedCall {
            target: self.address,
            calldata: calldata.into(),
            function: function.clone(),
        })
    }
}

/// One encoded call queued for a batch session, together with the
/// function needed to decode its slice of the aggregated response.
pub struct PreparedCall {
    pub(crate) target: Address,
    pub(crate) calldata: Bytes,
    pub(crate) function: Function,
}

impl PreparedCall {
    /// The call's target contract.
    pub fn target(&self) -> Address {
        self.target
    }

    /// The encoded calldata.
    pub fn calldata(&self) -> &Bytes {
        &self.calldata
    }
}

fn resolve_function<'a>(
    abi: &'a JsonAbi,
    address: Address,
    name: &str,
) -> Result<&'a Function> {
    abi.function(name)
        .and_then(|overloads| overloads.first())
        .ok_or_else(|| anyhow!("function {name} not found in ABI for {address}"))
}

/// The two handles for one registered contract, built together.
pub struct ContractPair {
    /// Per-call binding.
    pub direct: ContractHandle,
    /// Batch-session binding.
    pub batched: BatchContract,
}

/// In-memory map from contract address to its handle pair.
///
/// Rebuilt wholesale on every client re-initialization.
#[derive(Default)]
pub struct ContractRegistry {
    entries: HashMap<Address, ContractPair>,
}

impl ContractRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a contract, overwriting any existing entry at the
    /// same address.
    pub fn register(
        &mut self,
        address: Address,
        abi: Arc<JsonAbi>,
        handle: Arc<dyn NetworkHandle>,
    ) {
        debug!(address = %address, "registering contract");
        self.entries.insert(
            address,
            ContractPair {
                direct: ContractHandle::new(address, Arc::clone(&abi), handle),
                batched: BatchContract::new(address, abi),
            },
        );
    }

    /// Look up a registered contract. `None` means the address was
    /// never registered; callers decide how to handle the miss.
    pub fn lookup(&self, address: Address) -> Option<&ContractPair> {
        self.entries.get(&address)
    }

    /// Whether an address is registered.
    pub fn contains(&self, address: Address) -> bool {
        self.entries.contains_key(&address)
    }

    /// Number of registered contracts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over registered addresses, in no particular order.
    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.entries.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;
    use mockall::mock;

    use super::*;
    use crate::config::abis::ProtocolAbis;
    use crate::ports::network::FeeData;

    mock! {
        pub Net {}

        #[async_trait::async_trait]
        impl NetworkHandle for Net {
            async fn chain_id(&self) -> anyhow::Result<u64>;
            async fn fee_data(&self) -> anyhow::Result<FeeData>;
            async fn gas_price(&self) -> anyhow::Result<u128>;
            async fn accounts(&self) -> anyhow::Result<Vec<Address>>;
            async fn call(&self, to: Address, data: Bytes) -> anyhow::Result<Bytes>;
            async fn code_at(&self, address: Address) -> anyhow::Result<Bytes>;
        }
    }

    const TOKEN: Address = address!("3194cbdc3dbcd3e11a07892e7ba5c3394048cc87");
    const HOLDER: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

    fn registry_with_token() -> (ContractRegistry, Arc<JsonAbi>) {
        let abis = ProtocolAbis::load().unwrap();
        let mut registry = ContractRegistry::new();
        registry.register(TOKEN, Arc::clone(&abis.erc20), Arc::new(MockNet::new()));
        (registry, abis.erc20)
    }

    #[test]
    fn register_overwrites_existing_entry() {
        let (mut registry, abi) = registry_with_token();
        assert_eq!(registry.len(), 1);

        registry.register(TOKEN, abi, Arc::new(MockNet::new()));
        assert_eq!(registry.len(), 1, "duplicate address must overwrite");
    }

    #[test]
    fn lookup_miss_is_explicit() {
        let (registry, _) = registry_with_token();
        assert!(registry.lookup(HOLDER).is_none());
        assert!(registry.contains(TOKEN));
    }

    #[test]
    fn prepared_call_encodes_selector_and_args() {
        let (registry, _) = registry_with_token();
        let pair = registry.lookup(TOKEN).unwrap();

        let call = pair
            .batched
            .prepare("balanceOf", &[DynSolValue::Address(HOLDER)])
            .unwrap();

        // keccak256("balanceOf(address)")[..4] followed by the padded
        // argument word.
        assert_eq!(&call.calldata()[..4], &[0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(call.calldata().len(), 36);
        assert_eq!(call.target(), TOKEN);
    }

    #[test]
    fn unknown_function_is_an_error() {
        let (registry, _) = registry_with_token();
        let pair = registry.lookup(TOKEN).unwrap();
        assert!(pair.batched.prepare("mint_for_free", &[]).is_err());
    }
}
