//! Client Facade - Initialization and Lifecycle
//!
//! An explicit client object whose lifecycle the caller owns:
//! construct → `init` → ready → optionally re-`init`. Everything the
//! client holds (connection, signer, fee options, registry, constants)
//! lives in one `Ready` struct that is built completely before being
//! committed, so a failed `init` leaves the client exactly as
//! uninitialized as it started.
//!
//! Initialization sequence:
//! 1. Discard prior state
//! 2. Parse ABIs + protocol constants (pure, no I/O)
//! 3. Select and connect the backend
//! 4. Query chain id (+ optional expected-chain-id validation)
//! 5. Validate the batched-read deployment
//! 6. Resolve the signer address (degrades to read-only on failure)
//! 7. Resolve initial fee options
//! 8. Populate the contract registry
//! 9. Commit

use std::sync::Arc;

use alloy::json_abi::JsonAbi;
use alloy::primitives::Address;
use tracing::{info, instrument, warn};

use crate::adapters::chain::{
    self, BackendConfig, BackendKind, BatchReader, BatchSession, Connection, ContractPair,
    ContractRegistry, SignerIdentity,
};
use crate::config::{ProtocolAbis, ProtocolConfig, ProtocolConstants};
use crate::domain::fees::{FeeOverrides, TxFeeOptions, DEFAULT_GAS_LIMIT};
use crate::error::ClientError;
use crate::ports::network::NetworkHandle;
use crate::usecases::fee_resolver;

/// Options accepted by [`CrvusdClient::init`].
#[derive(Debug, Default)]
pub struct InitOptions {
    /// Initial fee overrides, in gwei. Kept across `update_fee_data`
    /// calls and extendable later via
    /// [`CrvusdClient::set_custom_fee_overrides`].
    pub fee_overrides: FeeOverrides,
    /// When set, `init` fails unless the backend reports this chain id.
    pub expected_chain_id: Option<u64>,
    /// Protocol deployment to manage; defaults to the mainnet set.
    pub protocol: Option<ProtocolConfig>,
}

/// Everything a ready client holds. Built completely, committed once.
struct Ready {
    backend_kind: BackendKind,
    handle: Arc<dyn NetworkHandle>,
    batch: BatchReader,
    signer: Option<SignerIdentity>,
    signer_address: Option<Address>,
    chain_id: u64,
    abis: ProtocolAbis,
    constants: ProtocolConstants,
    registry: ContractRegistry,
    fee_overrides: FeeOverrides,
    options: TxFeeOptions,
    gas_limit: u64,
}

/// Client for the protocol's on-chain contracts.
///
/// All state is in-memory and rebuilt by each `init`; nothing
/// persists. Mutating operations take `&mut self`, so re-initialization
/// cannot race in-flight reads.
#[derive(Default)]
pub struct CrvusdClient {
    inner: Option<Ready>,
}

impl CrvusdClient {
    /// Create an uninitialized client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a successful `init` has completed.
    pub fn is_ready(&self) -> bool {
        self.inner.is_some()
    }

    /// Initialize (or fully re-initialize) against a backend.
    ///
    /// Prior state is discarded before the first fallible step runs.
    /// On error the client is left uninitialized, never half-populated.
    #[instrument(skip_all, fields(kind = %backend.kind()))]
    pub async fn init(
        &mut self,
        backend: BackendConfig,
        options: InitOptions,
    ) -> Result<(), ClientError> {
        self.inner = None;

        let backend_kind = backend.kind();
        let abis = ProtocolAbis::load()?;
        let config = options.protocol.unwrap_or_else(ProtocolConfig::mainnet);
        let constants = ProtocolConstants::build(&config)?;

        let Connection { handle, signer } = chain::connect(backend)?;

        let chain_id = handle.chain_id().await?;
        if let Some(expected) = options.expected_chain_id {
            if chain_id != expected {
                return Err(ClientError::InvalidConfiguration(format!(
                    "expected chain id {expected}, backend reports {chain_id}"
                )));
            }
        }

        let batch = BatchReader::connect(Arc::clone(&handle)).await?;

        let (signer, signer_address) = resolve_signer_address(signer, handle.as_ref()).await;

        let fee_overrides = options.fee_overrides;
        let fee_options = fee_resolver::resolve(handle.as_ref(), &fee_overrides).await?;

        let mut registry = ContractRegistry::new();
        registry.register(
            constants.stablecoin,
            Arc::clone(&abis.erc20),
            Arc::clone(&handle),
        );
        for market in constants.markets.values() {
            registry.register(market.amm, Arc::clone(&abis.amm), Arc::clone(&handle));
            registry.register(
                market.controller,
                Arc::clone(&abis.controller),
                Arc::clone(&handle),
            );
            registry.register(
                market.collateral,
                Arc::clone(&abis.erc20),
                Arc::clone(&handle),
            );
        }

        info!(
            chain_id,
            contracts = registry.len(),
            signer = %signer_address.map(|a| a.to_string()).unwrap_or_default(),
            "client initialized"
        );

        self.inner = Some(Ready {
            backend_kind,
            handle,
            batch,
            signer,
            signer_address,
            chain_id,
            abis,
            constants,
            registry,
            fee_overrides,
            options: fee_options,
            gas_limit: DEFAULT_GAS_LIMIT,
        });
        Ok(())
    }

    /// Re-resolve fee options against the live network.
    ///
    /// Resolution computes entirely into a fresh value; on failure the
    /// previously resolved options are left untouched.
    pub async fn update_fee_data(&mut self) -> Result<(), ClientError> {
        let ready = self.inner.as_mut().ok_or(ClientError::NotInitialized)?;
        let fresh = fee_resolver::resolve(ready.handle.as_ref(), &ready.fee_overrides).await?;
        ready.options = fresh;
        Ok(())
    }

    /// Merge custom fee overrides into the stored set (later calls win
    /// per field). Takes effect at the next [`Self::update_fee_data`].
    pub fn set_custom_fee_overrides(&mut self, overrides: FeeOverrides) -> Result<(), ClientError> {
        let ready = self.inner.as_mut().ok_or(ClientError::NotInitialized)?;
        ready.fee_overrides.merge(overrides);
        Ok(())
    }

    /// Register (or replace) a contract in the registry.
    pub fn set_contract(&mut self, address: Address, abi: Arc<JsonAbi>) -> Result<(), ClientError> {
        let ready = self.inner.as_mut().ok_or(ClientError::NotInitialized)?;
        let handle = Arc::clone(&ready.handle);
        ready.registry.register(address, abi, handle);
        Ok(())
    }

    /// Currently resolved transaction fee options.
    pub fn options(&self) -> Result<&TxFeeOptions, ClientError> {
        Ok(&self.ready()?.options)
    }

    /// Currently stored fee overrides.
    pub fn fee_overrides(&self) -> Result<&FeeOverrides, ClientError> {
        Ok(&self.ready()?.fee_overrides)
    }

    /// The contract registry.
    pub fn registry(&self) -> Result<&ContractRegistry, ClientError> {
        Ok(&self.ready()?.registry)
    }

    /// Look up a registered contract; a miss is an explicit error.
    pub fn contract(&self, address: Address) -> Result<&ContractPair, ClientError> {
        self.ready()?
            .registry
            .lookup(address)
            .ok_or(ClientError::ContractNotFound(address))
    }

    /// The protocol constants bundle.
    pub fn constants(&self) -> Result<&ProtocolConstants, ClientError> {
        Ok(&self.ready()?.constants)
    }

    /// The protocol ABI set.
    pub fn abis(&self) -> Result<&ProtocolAbis, ClientError> {
        Ok(&self.ready()?.abis)
    }

    /// The signing identity, if any.
    pub fn signer(&self) -> Result<Option<&SignerIdentity>, ClientError> {
        Ok(self.ready()?.signer.as_ref())
    }

    /// The signer's address; `None` when operating read-only.
    pub fn signer_address(&self) -> Result<Option<Address>, ClientError> {
        Ok(self.ready()?.signer_address)
    }

    /// The connected chain id.
    pub fn chain_id(&self) -> Result<u64, ClientError> {
        Ok(self.ready()?.chain_id)
    }

    /// The backend kind this client was initialized with.
    pub fn backend_kind(&self) -> Result<BackendKind, ClientError> {
        Ok(self.ready()?.backend_kind)
    }

    /// Gas limit attached alongside the fee options.
    pub fn gas_limit(&self) -> Result<u64, ClientError> {
        Ok(self.ready()?.gas_limit)
    }

    /// Start a batched read session.
    pub fn batch_session(&self) -> Result<BatchSession, ClientError> {
        Ok(self.ready()?.batch.session())
    }

    fn ready(&self) -> Result<&Ready, ClientError> {
        self.inner.as_ref().ok_or(ClientError::NotInitialized)
    }
}

/// Resolve the signer's address, degrading to read-only mode when the
/// backend cannot produce one. Read-only operation stays valid without
/// a signer, so this failure is recovered here, not propagated.
async fn resolve_signer_address(
    signer: Option<SignerIdentity>,
    handle: &dyn NetworkHandle,
) -> (Option<SignerIdentity>, Option<Address>) {
    match signer {
        Some(SignerIdentity::Local(signer)) => {
            let address = signer.address();
            (Some(SignerIdentity::Local(signer)), Some(address))
        }
        Some(SignerIdentity::Node) => match handle.accounts().await {
            Ok(accounts) if !accounts.is_empty() => {
                (Some(SignerIdentity::Node), Some(accounts[0]))
            }
            Ok(_) => {
                warn!("backend has no unlocked accounts, continuing read-only");
                (None, None)
            }
            Err(e) => {
                warn!(error = %e, "signer address query failed, continuing read-only");
                (None, None)
            }
        },
        None => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations_require_initialization() {
        let client = CrvusdClient::new();
        assert!(!client.is_ready());
        assert!(matches!(client.options(), Err(ClientError::NotInitialized)));
        assert!(matches!(
            client.chain_id(),
            Err(ClientError::NotInitialized)
        ));
        assert!(matches!(
            client.contract(Address::ZERO),
            Err(ClientError::NotInitialized)
        ));
    }

    #[test]
    fn mutators_require_initialization() {
        let mut client = CrvusdClient::new();
        assert!(matches!(
            client.set_custom_fee_overrides(FeeOverrides::default()),
            Err(ClientError::NotInitialized)
        ));
    }
}
