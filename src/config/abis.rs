//! Embedded Contract Interface Descriptions
//!
//! The protocol's static ABIs, shipped with the crate and parsed into
//! `JsonAbi` at initialization so malformed data surfaces as a
//! configuration error instead of a panic. Callers registering their
//! own contracts supply their own `JsonAbi` instead.

use std::sync::Arc;

use alloy::json_abi::JsonAbi;

use crate::error::ClientError;

const ERC20_ABI: &str = include_str!("abis/erc20.json");
const AMM_ABI: &str = include_str!("abis/amm.json");
const CONTROLLER_ABI: &str = include_str!("abis/controller.json");

/// Parsed interface descriptions for the protocol's contract shapes.
///
/// Shared via `Arc` with every registry entry built from them.
#[derive(Debug, Clone)]
pub struct ProtocolAbis {
    /// Token interface: the stablecoin and every collateral token.
    pub erc20: Arc<JsonAbi>,
    /// Market-maker (AMM) interface.
    pub amm: Arc<JsonAbi>,
    /// Loan controller interface.
    pub controller: Arc<JsonAbi>,
}

impl ProtocolAbis {
    /// Parse the embedded ABI set.
    pub fn load() -> Result<Self, ClientError> {
        Ok(Self {
            erc20: parse("ERC20", ERC20_ABI)?,
            amm: parse("AMM", AMM_ABI)?,
            controller: parse("controller", CONTROLLER_ABI)?,
        })
    }
}

fn parse(name: &str, raw: &str) -> Result<Arc<JsonAbi>, ClientError> {
    serde_json::from_str(raw).map(Arc::new).map_err(|e| {
        ClientError::InvalidConfiguration(format!("embedded {name} ABI is malformed: {e}"))
    })
}
