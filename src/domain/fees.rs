//! Fee-Pricing Data Model
//!
//! User-facing fee overrides are denominated in gwei (the unit people
//! actually quote); resolved transaction options are denominated in wei.
//! `TxFeeOptions` is a sum type so that legacy and dynamic pricing are
//! mutually exclusive by construction: committing one variant
//! structurally discards the fields of the other.

use alloy::primitives::utils::parse_units;
use alloy::primitives::U256;

use crate::error::ClientError;

/// Gas limit attached to transactions alongside the resolved fee
/// options. Generous enough for every protocol operation.
pub const DEFAULT_GAS_LIMIT: u64 = 12_000_000;

/// User-supplied fee overrides, in gwei per gas unit.
///
/// Each field independently shadows the corresponding network-reported
/// value during resolution. Overrides survive `update_fee_data` calls
/// and are only reset by a fresh `init`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeeOverrides {
    /// Legacy gas price override (gwei).
    pub gas_price: Option<f64>,
    /// EIP-1559 max fee override (gwei).
    pub max_fee_per_gas: Option<f64>,
    /// EIP-1559 priority fee override (gwei).
    pub max_priority_fee_per_gas: Option<f64>,
}

impl FeeOverrides {
    /// Merge `other` into `self`, per field. Fields set in `other`
    /// win; fields left unset keep their current value.
    pub fn merge(&mut self, other: Self) {
        if other.gas_price.is_some() {
            self.gas_price = other.gas_price;
        }
        if other.max_fee_per_gas.is_some() {
            self.max_fee_per_gas = other.max_fee_per_gas;
        }
        if other.max_priority_fee_per_gas.is_some() {
            self.max_priority_fee_per_gas = other.max_priority_fee_per_gas;
        }
    }

    /// True if no field is set.
    pub fn is_empty(&self) -> bool {
        self.gas_price.is_none()
            && self.max_fee_per_gas.is_none()
            && self.max_priority_fee_per_gas.is_none()
    }
}

/// Resolved transaction fee options, in wei.
///
/// Exactly one pricing model is populated at any time. Replacing the
/// value (the only way to change it) clears the other model's fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxFeeOptions {
    /// Single gas-price pricing for chains without a dynamic fee market.
    Legacy {
        /// Gas price in wei.
        gas_price: u128,
    },
    /// Base-fee + priority-fee pricing.
    Eip1559 {
        /// Max fee per gas in wei.
        max_fee_per_gas: u128,
        /// Max priority fee per gas in wei.
        max_priority_fee_per_gas: u128,
    },
}

impl TxFeeOptions {
    /// Legacy gas price, if this is the legacy model.
    pub fn gas_price(&self) -> Option<u128> {
        match self {
            Self::Legacy { gas_price } => Some(*gas_price),
            Self::Eip1559 { .. } => None,
        }
    }

    /// Max fee per gas, if this is the dynamic model.
    pub fn max_fee_per_gas(&self) -> Option<u128> {
        match self {
            Self::Legacy { .. } => None,
            Self::Eip1559 { max_fee_per_gas, .. } => Some(*max_fee_per_gas),
        }
    }

    /// Max priority fee per gas, if this is the dynamic model.
    pub fn max_priority_fee_per_gas(&self) -> Option<u128> {
        match self {
            Self::Legacy { .. } => None,
            Self::Eip1559 {
                max_priority_fee_per_gas,
                ..
            } => Some(*max_priority_fee_per_gas),
        }
    }

    /// True for the legacy (single gas-price) model.
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy { .. })
    }
}

/// Convert a gwei-denominated user value to wei.
///
/// Rejects negative values, values with sub-wei precision, and values
/// that overflow `u128` — all of which indicate a bad override rather
/// than a network condition.
pub fn gwei_to_wei(gwei: f64) -> Result<u128, ClientError> {
    let parsed = parse_units(&gwei.to_string(), "gwei").map_err(|e| {
        ClientError::InvalidConfiguration(format!("invalid gwei value {gwei}: {e}"))
    })?;
    let wei: U256 = parsed.get_absolute();
    u128::try_from(wei).map_err(|_| {
        ClientError::InvalidConfiguration(format!("gwei value {gwei} overflows u128 wei"))
    })
}
