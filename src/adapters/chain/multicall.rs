//! Batched Read Sessions - Multicall3 Aggregation
//!
//! Executes many prepared contract reads in a single `eth_call` by
//! routing them through the canonical Multicall3 deployment. The
//! reader is validated once at client initialization (deployed-code
//! check); sessions are cheap to create afterwards.

use std::sync::Arc;

use alloy::dyn_abi::{DynSolValue, FunctionExt};
use alloy::primitives::{address, Address};
use alloy::sol;
use alloy::sol_types::SolCall;
use anyhow::{bail, Context, Result};
use tracing::{debug, instrument};

use super::contracts::PreparedCall;
use crate::error::ClientError;
use crate::ports::network::NetworkHandle;

/// Canonical Multicall3 deployment, same address on every major chain.
pub const MULTICALL3: Address = address!("cA11bde05977b3631167028862bE2a173976CA11");

sol! {
    struct Call3 {
        address target;
        bool allowFailure;
        bytes callData;
    }

    struct Call3Result {
        bool success;
        bytes returnData;
    }

    function aggregate3(Call3[] calldata calls)
        external
        payable
        returns (Call3Result[] memory returnData);
}

/// Factory for batched read sessions over one network handle.
pub struct BatchReader {
    handle: Arc<dyn NetworkHandle>,
}

impl BatchReader {
    /// Bind to a network handle, verifying that Multicall3 is actually
    /// deployed there. This prevents misconfiguration (e.g. a private
    /// devnet without the deployment) from silently failing at
    /// runtime.
    #[instrument(skip_all)]
    pub async fn connect(handle: Arc<dyn NetworkHandle>) -> Result<Self, ClientError> {
        let code = handle.code_at(MULTICALL3).await?;
        if code.is_empty() {
            return Err(ClientError::InvalidConfiguration(format!(
                "no Multicall3 deployment at {MULTICALL3} on this network"
            )));
        }
        debug!("batch reader ready");
        Ok(Self { handle })
    }

    /// Start an empty session.
    pub fn session(&self) -> BatchSession {
        BatchSession {
            handle: Arc::clone(&self.handle),
            calls: Vec::new(),
        }
    }
}

/// One batch of prepared reads, executed in a single round-trip.
pub struct BatchSession {
    handle: Arc<dyn NetworkHandle>,
    calls: Vec<PreparedCall>,
}

impl BatchSession {
    /// Queue a prepared call; returns its index in the result vector.
    pub fn push(&mut self, call: PreparedCall) -> usize {
        self.calls.push(call);
        self.calls.len() - 1
    }

    /// Number of queued calls.
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Execute every queued call via one `aggregate3` invocation and
    /// decode each output with its own function signature. An empty
    /// session completes without touching the network.
    pub async fn execute(self) -> Result<Vec<Vec<DynSolValue>>> {
        if self.calls.is_empty() {
            return Ok(Vec::new());
        }

        let calls: Vec<Call3> = self
            .calls
            .iter()
            .map(|call| Call3 {
                target: call.target,
                allowFailure: false,
                callData: call.calldata.clone(),
            })
            .collect();
        let request = aggregate3Call { calls }.abi_encode();

        debug!(calls = self.calls.len(), "executing batch read");
        let raw = self.handle.call(MULTICALL3, request.into()).await?;
        let response = aggregate3Call::abi_decode_returns(&raw, true)
            .context("failed to decode aggregate3 response")?;

        if response.returnData.len() != self.calls.len() {
            bail!(
                "aggregate3 returned {} results for {} calls",
                response.returnData.len(),
                self.calls.len()
            );
        }

        self.calls
            .iter()
            .zip(response.returnData.iter())
            .map(|(call, result)| {
                if !result.success {
                    bail!("batched call to {} reverted", call.target);
                }
                call.function
                    .abi_decode_output(&result.returnData, true)
                    .with_context(|| format!("failed to decode output of call to {}", call.target))
            })
            .collect()
    }
}
