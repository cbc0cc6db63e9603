//! Fee Strategy Resolver
//!
//! Turns a live fee-market snapshot plus user overrides into resolved
//! transaction options. This is the refresh path: it may be re-invoked
//! at any time and always computes into a fresh value, so a failed
//! refresh never leaves half-written options behind.
//!
//! Branch selection:
//! - both dynamic fields reported → EIP-1559 pricing, each field taken
//!   from the override (gwei → wei) when set, else from the network;
//! - anything less → legacy pricing, gas price taken from the override
//!   when set, else from the snapshot, else from a distinct on-demand
//!   gas-price query.
//!
//! The sum-type return makes the two branches mutually exclusive: the
//! legacy branch cannot carry dynamic fields and vice versa.

use tracing::debug;

use crate::domain::fees::{gwei_to_wei, FeeOverrides, TxFeeOptions};
use crate::error::ClientError;
use crate::ports::network::NetworkHandle;

/// Resolve current transaction fee options.
///
/// Idempotent for unchanged network responses and overrides. Network
/// failures propagate to the caller; nothing is retried here.
pub async fn resolve(
    handle: &dyn NetworkHandle,
    overrides: &FeeOverrides,
) -> Result<TxFeeOptions, ClientError> {
    let fee_data = handle.fee_data().await?;

    let resolved = match (fee_data.max_fee_per_gas, fee_data.max_priority_fee_per_gas) {
        (Some(network_max_fee), Some(network_priority)) => {
            let max_fee_per_gas = match overrides.max_fee_per_gas {
                Some(gwei) => gwei_to_wei(gwei)?,
                None => network_max_fee,
            };
            let max_priority_fee_per_gas = match overrides.max_priority_fee_per_gas {
                Some(gwei) => gwei_to_wei(gwei)?,
                None => network_priority,
            };
            TxFeeOptions::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            }
        }
        _ => {
            let gas_price = match overrides.gas_price {
                Some(gwei) => gwei_to_wei(gwei)?,
                None => match fee_data.gas_price {
                    Some(price) => price,
                    None => handle.gas_price().await?,
                },
            };
            TxFeeOptions::Legacy { gas_price }
        }
    };

    debug!(?resolved, "fee options resolved");
    Ok(resolved)
}
