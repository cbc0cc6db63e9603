//! Configuration Module - Protocol Deployment Description
//!
//! Describes which contracts the client manages: the stablecoin, the
//! per-market amm/controller/collateral triples, and the coin symbol
//! table. A built-in mainnet deployment is provided; custom
//! deployments load from TOML. Raw configuration is string-typed;
//! `ProtocolConstants::build` validates it into parsed addresses and
//! derives the decimals table.

pub mod abis;

use std::collections::BTreeMap;

use alloy::primitives::Address;
use serde::Deserialize;
use tracing::info;

use crate::error::ClientError;

pub use abis::ProtocolAbis;

/// The stablecoin always carries 18 decimals.
pub const STABLECOIN_DECIMALS: u8 = 18;

/// Raw protocol deployment description, as found in TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct ProtocolConfig {
    /// Stablecoin token address.
    pub stablecoin: String,
    /// Coin symbol → token address.
    #[serde(default)]
    pub coins: BTreeMap<String, String>,
    /// Market name → deployed market contracts.
    pub markets: BTreeMap<String, MarketParams>,
}

/// One mint market's deployed contracts.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketParams {
    /// Market-maker (AMM) contract address.
    pub amm: String,
    /// Loan controller contract address.
    pub controller: String,
    /// Collateral token address.
    pub collateral: String,
    /// Collateral token decimals.
    pub collateral_decimals: u8,
}

impl ProtocolConfig {
    /// The Ethereum mainnet deployment.
    pub fn mainnet() -> Self {
        let market = |amm: &str, controller: &str, collateral: &str, decimals: u8| MarketParams {
            amm: amm.to_owned(),
            controller: controller.to_owned(),
            collateral: collateral.to_owned(),
            collateral_decimals: decimals,
        };

        Self {
            stablecoin: "0x3194cbdc3dbcd3e11a07892e7ba5c3394048cc87".to_owned(),
            coins: [
                ("crvusd", "0x3194cbdc3dbcd3e11a07892e7ba5c3394048cc87"),
                ("eth", "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee"),
                ("weth", "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"),
                ("sfrxeth", "0xac3e018457b222d93114458476f3e3416abbe38f"),
                ("wsteth", "0x7f39c581f595b53c5cb19bd0b3f8da6c935e2ca0"),
                ("wbtc", "0x2260fac5e5542a773aa44fbcfedf7c193bc2c599"),
            ]
            .into_iter()
            .map(|(symbol, address)| (symbol.to_owned(), address.to_owned()))
            .collect(),
            markets: [
                (
                    "sfrxeth",
                    market(
                        "0x136e783846ef68c8bd00a3369f787df8d683a696",
                        "0x8472a9a7632b173c8cf3a86d3afec50c35548e76",
                        "0xac3e018457b222d93114458476f3e3416abbe38f",
                        18,
                    ),
                ),
                (
                    "wsteth",
                    market(
                        "0x37417b2238aa52d0dd2d6252d989e728e8f706e4",
                        "0x100daa78fc509db39ef7d04de0c1abd299f4c6ce",
                        "0x7f39c581f595b53c5cb19bd0b3f8da6c935e2ca0",
                        18,
                    ),
                ),
                (
                    "wbtc",
                    market(
                        "0xe0438eb3703bf871e31ce639bd351109c88666ea",
                        "0x4e59541306910ad6dc1dac0ac9dfb29bd9f15c67",
                        "0x2260fac5e5542a773aa44fbcfedf7c193bc2c599",
                        8,
                    ),
                ),
                (
                    "weth",
                    market(
                        "0x1681195c176239ac5e72d9aebacf5b2492e0c4ee",
                        "0xa920de414ea4ab66b97da1bfe9e6eca7d4219635",
                        "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
                        18,
                    ),
                ),
            ]
            .into_iter()
            .map(|(name, params)| (name.to_owned(), params))
            .collect(),
        }
    }

    /// Load a custom deployment description from TOML.
    pub fn from_toml_str(raw: &str) -> Result<Self, ClientError> {
        toml::from_str(raw).map_err(|e| {
            ClientError::InvalidConfiguration(format!("failed to parse protocol config: {e}"))
        })
    }
}

/// One mint market with parsed addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintMarket {
    /// Market-maker (AMM) contract.
    pub amm: Address,
    /// Loan controller contract.
    pub controller: Address,
    /// Collateral token contract.
    pub collateral: Address,
    /// Collateral token decimals.
    pub collateral_decimals: u8,
}

/// Validated protocol constants, built once per initialization and
/// read-only thereafter.
#[derive(Debug, Clone)]
pub struct ProtocolConstants {
    /// Stablecoin token address.
    pub stablecoin: Address,
    /// Market name → parsed market descriptor.
    pub markets: BTreeMap<String, MintMarket>,
    /// Coin symbol → token address.
    pub coins: BTreeMap<String, Address>,
    /// Token address → decimals, derived from the market table plus
    /// the stablecoin itself.
    pub decimals: BTreeMap<Address, u8>,
}

impl ProtocolConstants {
    /// Parse and validate a raw configuration.
    pub fn build(config: &ProtocolConfig) -> Result<Self, ClientError> {
        if config.markets.is_empty() {
            return Err(ClientError::InvalidConfiguration(
                "at least one market must be configured".to_owned(),
            ));
        }

        let stablecoin = parse_address("stablecoin", &config.stablecoin)?;

        let mut markets = BTreeMap::new();
        let mut decimals = BTreeMap::new();
        for (name, params) in &config.markets {
            let market = MintMarket {
                amm: parse_address(&format!("market {name} amm"), &params.amm)?,
                controller: parse_address(&format!("market {name} controller"), &params.controller)?,
                collateral: parse_address(&format!("market {name} collateral"), &params.collateral)?,
                collateral_decimals: params.collateral_decimals,
            };
            decimals.insert(market.collateral, market.collateral_decimals);
            markets.insert(name.clone(), market);
        }
        decimals.insert(stablecoin, STABLECOIN_DECIMALS);

        let mut coins = BTreeMap::new();
        for (symbol, address) in &config.coins {
            coins.insert(
                symbol.clone(),
                parse_address(&format!("coin {symbol}"), address)?,
            );
        }

        info!(
            markets = markets.len(),
            coins = coins.len(),
            "protocol constants built"
        );
        Ok(Self {
            stablecoin,
            markets,
            coins,
            decimals,
        })
    }

    /// Every address the client registers at initialization: the
    /// stablecoin plus each market's amm, controller and collateral.
    pub fn registered_addresses(&self) -> impl Iterator<Item = Address> + '_ {
        std::iter::once(self.stablecoin).chain(self.markets.values().flat_map(|market| {
            [market.amm, market.controller, market.collateral].into_iter()
        }))
    }
}

fn parse_address(field: &str, raw: &str) -> Result<Address, ClientError> {
    raw.parse()
        .map_err(|e| ClientError::InvalidConfiguration(format!("invalid {field} address {raw}: {e}")))
}
