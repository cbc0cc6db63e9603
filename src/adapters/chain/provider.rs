//! Chain Backend Selector - alloy-rs 0.9 Connection Management
//!
//! Resolves a backend configuration into a connected network handle
//! plus an optional signing identity. Four connection modes are
//! supported: a direct JSON-RPC endpoint (with or without a local
//! key), an externally supplied handle, and the Infura/Alchemy hosted
//! read-only services.
//!
//! In alloy 0.9, `ProviderBuilder::new().on_http()` returns a complex
//! filler type. We store it as a type-erased `dyn Provider` behind the
//! `NetworkHandle` port to keep the API clean across the client.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::client::RpcClient;
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use anyhow::Context;
use async_trait::async_trait;
use tracing::{info, instrument};

use crate::error::ClientError;
use crate::ports::network::{FeeData, NetworkHandle};

/// Endpoint used when a JSON-RPC backend is configured without a URL.
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// Backend connection settings.
///
/// A tagged union: each mode only carries the fields that are valid
/// for it, so invalid combinations cannot be constructed.
pub enum BackendConfig {
    /// Direct JSON-RPC endpoint. With a private key the client signs
    /// locally; without one it falls back to the node's default
    /// unlocked account.
    JsonRpc {
        /// Endpoint URL; defaults to [`DEFAULT_RPC_URL`].
        url: Option<String>,
        /// Hex-encoded private key (0x prefix optional).
        private_key: Option<String>,
    },
    /// A pre-established connection supplied by the caller, e.g. an
    /// embedding application's own transport. The default unlocked
    /// account is requested from the handle.
    External {
        /// The caller-owned network handle.
        handle: Arc<dyn NetworkHandle>,
    },
    /// Infura hosted endpoint. Read-only: no signing identity.
    Infura {
        /// Network name, e.g. "mainnet" (the default) or "sepolia".
        network: Option<String>,
        /// Infura project API key.
        api_key: String,
    },
    /// Alchemy hosted endpoint. Read-only: no signing identity.
    Alchemy {
        /// Network name, e.g. "mainnet" (the default) or "sepolia".
        network: Option<String>,
        /// Alchemy API key.
        api_key: String,
    },
}

impl BackendConfig {
    /// The kind tag for this configuration.
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::JsonRpc { .. } => BackendKind::JsonRpc,
            Self::External { .. } => BackendKind::External,
            Self::Infura { .. } => BackendKind::Infura,
            Self::Alchemy { .. } => BackendKind::Alchemy,
        }
    }
}

// Credentials must never appear in logs, so no derived Debug here.
impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JsonRpc { url, private_key } => f
                .debug_struct("JsonRpc")
                .field("url", url)
                .field("private_key", &private_key.as_ref().map(|_| "<redacted>"))
                .finish(),
            Self::External { .. } => f.debug_struct("External").finish_non_exhaustive(),
            Self::Infura { network, .. } => f
                .debug_struct("Infura")
                .field("network", network)
                .field("api_key", &"<redacted>")
                .finish(),
            Self::Alchemy { network, .. } => f
                .debug_struct("Alchemy")
                .field("network", network)
                .field("api_key", &"<redacted>")
                .finish(),
        }
    }
}

/// Recognized backend kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Direct JSON-RPC endpoint.
    JsonRpc,
    /// Caller-supplied connection.
    External,
    /// Infura hosted service.
    Infura,
    /// Alchemy hosted service.
    Alchemy,
}

impl FromStr for BackendKind {
    type Err = ClientError;

    /// Case-insensitive; `web3` is accepted as an alias for `external`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jsonrpc" | "json-rpc" => Ok(Self::JsonRpc),
            "external" | "web3" => Ok(Self::External),
            "infura" => Ok(Self::Infura),
            "alchemy" => Ok(Self::Alchemy),
            other => Err(ClientError::InvalidConfiguration(format!(
                "unrecognized backend kind: {other}"
            ))),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::JsonRpc => "jsonrpc",
            Self::External => "external",
            Self::Infura => "infura",
            Self::Alchemy => "alchemy",
        };
        f.write_str(name)
    }
}

/// How the client signs, when it signs at all.
#[derive(Debug, Clone)]
pub enum SignerIdentity {
    /// Key held by the client; address is derived locally.
    Local(PrivateKeySigner),
    /// The backend's default unlocked account; address is resolved by
    /// querying the handle and may turn out to be unavailable.
    Node,
}

/// A resolved backend connection: the network handle plus the signing
/// identity the kind implies (hosted backends have none).
pub struct Connection {
    /// Shared read/query handle to the network.
    pub handle: Arc<dyn NetworkHandle>,
    /// Signing identity, if the backend kind provides one.
    pub signer: Option<SignerIdentity>,
}

// `dyn NetworkHandle` is not `Debug`, so `Connection` cannot derive it;
// a manual impl (required by tests' `unwrap_err`) avoids printing the
// handle or any signer secret.
impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("has_signer", &self.signer.is_some())
            .finish_non_exhaustive()
    }
}

/// Resolve a backend configuration into a connection.
///
/// Establishing the HTTP transport is lazy (no network round-trip
/// happens here); the first query over the handle surfaces
/// connectivity problems.
#[instrument(skip_all, fields(kind = %backend.kind()))]
pub fn connect(backend: BackendConfig) -> Result<Connection, ClientError> {
    match backend {
        BackendConfig::JsonRpc { url, private_key } => {
            let url = url.unwrap_or_else(|| DEFAULT_RPC_URL.to_owned());
            match private_key {
                Some(key) => {
                    let signer: PrivateKeySigner = key.trim().parse().map_err(|e| {
                        ClientError::InvalidConfiguration(format!("invalid private key: {e}"))
                    })?;
                    let wallet = EthereumWallet::from(signer.clone());
                    let handle = http_handle(&url, Some(wallet))?;
                    info!(signer = %signer.address(), "connected JSON-RPC backend with local signer");
                    Ok(Connection {
                        handle,
                        signer: Some(SignerIdentity::Local(signer)),
                    })
                }
                None => {
                    let handle = http_handle(&url, None)?;
                    info!("connected JSON-RPC backend, deferring to node account");
                    Ok(Connection {
                        handle,
                        signer: Some(SignerIdentity::Node),
                    })
                }
            }
        }
        BackendConfig::External { handle } => {
            info!("adopted externally supplied connection");
            Ok(Connection {
                handle,
                signer: Some(SignerIdentity::Node),
            })
        }
        BackendConfig::Infura { network, api_key } => {
            let network = network.unwrap_or_else(|| "mainnet".to_owned());
            let url = hosted_url(BackendKind::Infura, &network, &api_key)?;
            let handle = http_handle(&url, None)?;
            info!(network = %network, "connected Infura backend (read-only)");
            Ok(Connection {
                handle,
                signer: None,
            })
        }
        BackendConfig::Alchemy { network, api_key } => {
            let network = network.unwrap_or_else(|| "mainnet".to_owned());
            let url = hosted_url(BackendKind::Alchemy, &network, &api_key)?;
            let handle = http_handle(&url, None)?;
            info!(network = %network, "connected Alchemy backend (read-only)");
            Ok(Connection {
                handle,
                signer: None,
            })
        }
    }
}

/// Build the service URL for a hosted backend.
fn hosted_url(kind: BackendKind, network: &str, api_key: &str) -> Result<String, ClientError> {
    if api_key.is_empty() {
        return Err(ClientError::InvalidConfiguration(format!(
            "{kind} backend requires an API key"
        )));
    }
    Ok(match kind {
        BackendKind::Infura => format!("https://{network}.infura.io/v3/{api_key}"),
        BackendKind::Alchemy => format!("https://eth-{network}.g.alchemy.com/v2/{api_key}"),
        BackendKind::JsonRpc | BackendKind::External => unreachable!("not a hosted kind"),
    })
}

/// Build an HTTP-backed network handle, optionally with a wallet
/// filler so locally signed transactions can be submitted later.
fn http_handle(
    url: &str,
    wallet: Option<EthereumWallet>,
) -> Result<Arc<dyn NetworkHandle>, ClientError> {
    let parsed = url
        .parse()
        .map_err(|e| ClientError::InvalidConfiguration(format!("invalid RPC URL: {e}")))?;
    // Box the transport so the resulting provider satisfies the
    // `dyn Provider` (BoxTransport) erasure used by `RpcNetwork`.
    let client = RpcClient::new_http(parsed).boxed();
    let handle: Arc<dyn NetworkHandle> = match wallet {
        Some(wallet) => Arc::new(RpcNetwork::new(
            ProviderBuilder::new().wallet(wallet).on_client(client),
        )),
        None => Arc::new(RpcNetwork::new(ProviderBuilder::new().on_client(client))),
    };
    Ok(handle)
}

/// `NetworkHandle` implementation over an alloy provider.
///
/// Uses `dyn Provider` for type erasure because alloy 0.9's
/// `ProviderBuilder::new().on_http()` returns a deeply-nested generic
/// filler type that would leak implementation details.
pub struct RpcNetwork {
    provider: Arc<dyn Provider + Send + Sync>,
}

impl RpcNetwork {
    /// Wrap an alloy provider.
    pub fn new(provider: impl Provider + Send + Sync + 'static) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }
}

#[async_trait]
impl NetworkHandle for RpcNetwork {
    async fn chain_id(&self) -> anyhow::Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .context("Failed to query chain ID")
    }

    async fn fee_data(&self) -> anyhow::Result<FeeData> {
        let gas_price = self.provider.get_gas_price().await.ok();
        // Nodes without a dynamic fee market reject the estimate; that
        // is a legitimate answer, not an error.
        let (max_fee_per_gas, max_priority_fee_per_gas) =
            match self.provider.estimate_eip1559_fees(None).await {
                Ok(estimate) => (
                    Some(estimate.max_fee_per_gas),
                    Some(estimate.max_priority_fee_per_gas),
                ),
                Err(_) => (None, None),
            };
        Ok(FeeData {
            gas_price,
            max_fee_per_gas,
            max_priority_fee_per_gas,
        })
    }

    async fn gas_price(&self) -> anyhow::Result<u128> {
        self.provider
            .get_gas_price()
            .await
            .context("Failed to query gas price")
    }

    async fn accounts(&self) -> anyhow::Result<Vec<Address>> {
        self.provider
            .get_accounts()
            .await
            .context("Failed to query unlocked accounts")
    }

    async fn call(&self, to: Address, data: Bytes) -> anyhow::Result<Bytes> {
        let request = TransactionRequest::default().with_to(to).with_input(data);
        self.provider.call(&request).await.context("eth_call failed")
    }

    async fn code_at(&self, address: Address) -> anyhow::Result<Bytes> {
        self.provider
            .get_code_at(address)
            .await
            .context("Failed to query deployed code")
    }
}
