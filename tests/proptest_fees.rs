//! Property-Based Tests — Fee Resolution Invariants
//!
//! Uses `proptest` to verify the resolver's structural invariants
//! across random fee snapshots and overrides: the legacy/dynamic XOR,
//! idempotence, and override precedence.

use alloy::primitives::{Address, Bytes};
use mockall::mock;
use proptest::prelude::*;

use crvusd_client::{FeeData, FeeOverrides, NetworkHandle, TxFeeOptions};

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

fn block_on_resolve(fee_data: FeeData, overrides: FeeOverrides) -> TxFeeOptions {
    let mut net = MockNet::new();
    net.expect_fee_data().returning(move || Ok(fee_data));
    // On-demand fallback for snapshots with no gas price at all.
    net.expect_gas_price().returning(|| Ok(1_000_000_000));

    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(crvusd_client::usecases::fee_resolver::resolve(
            &net, &overrides,
        ))
        .unwrap()
}

/// Wei values kept below 2^100 so gwei overrides never collide with
/// overflow handling; gwei overrides as small whole numbers.
fn fee_data_strategy() -> impl Strategy<Value = FeeData> {
    (
        proptest::option::of(1u128..u128::from(u64::MAX)),
        proptest::option::of(1u128..u128::from(u64::MAX)),
        proptest::option::of(1u128..u128::from(u64::MAX)),
    )
        .prop_map(|(gas_price, max_fee_per_gas, max_priority_fee_per_gas)| FeeData {
            gas_price,
            max_fee_per_gas,
            max_priority_fee_per_gas,
        })
}

proptest! {
    /// Resolved options are legacy iff the snapshot lacks a complete
    /// dynamic fee market — and never carry both pricing models.
    #[test]
    fn resolution_matches_presence_matrix(fee_data in fee_data_strategy()) {
        let resolved = block_on_resolve(fee_data, FeeOverrides::default());

        if fee_data.supports_eip1559() {
            prop_assert!(!resolved.is_legacy());
            prop_assert!(resolved.gas_price().is_none());
            prop_assert!(resolved.max_fee_per_gas().is_some());
            prop_assert!(resolved.max_priority_fee_per_gas().is_some());
        } else {
            prop_assert!(resolved.is_legacy());
            prop_assert!(resolved.gas_price().is_some());
            prop_assert!(resolved.max_fee_per_gas().is_none());
            prop_assert!(resolved.max_priority_fee_per_gas().is_none());
        }
    }

    /// Unchanged inputs resolve to bit-identical options.
    #[test]
    fn resolution_is_idempotent(
        fee_data in fee_data_strategy(),
        gas_override in proptest::option::of(1u32..100_000),
    ) {
        let overrides = FeeOverrides {
            gas_price: gas_override.map(f64::from),
            ..FeeOverrides::default()
        };
        let first = block_on_resolve(fee_data, overrides);
        let second = block_on_resolve(fee_data, overrides);
        prop_assert_eq!(first, second);
    }

    /// In legacy mode a gas-price override always wins, converted from
    /// gwei to wei, regardless of what the network reports.
    #[test]
    fn gas_price_override_wins_in_legacy_mode(
        network_price in proptest::option::of(1u128..u128::from(u64::MAX)),
        override_gwei in 1u32..1_000_000,
    ) {
        let fee_data = FeeData { gas_price: network_price, ..FeeData::default() };
        let overrides = FeeOverrides {
            gas_price: Some(f64::from(override_gwei)),
            ..FeeOverrides::default()
        };

        let resolved = block_on_resolve(fee_data, overrides);
        prop_assert_eq!(
            resolved.gas_price(),
            Some(u128::from(override_gwei) * 1_000_000_000)
        );
    }

    /// In dynamic mode each override shadows only its own field.
    #[test]
    fn dynamic_overrides_shadow_per_field(
        network_max_fee in 1u128..u128::from(u64::MAX),
        network_priority in 1u128..u128::from(u64::MAX),
        priority_gwei in 1u32..100_000,
    ) {
        let fee_data = FeeData {
            gas_price: None,
            max_fee_per_gas: Some(network_max_fee),
            max_priority_fee_per_gas: Some(network_priority),
        };
        let overrides = FeeOverrides {
            max_priority_fee_per_gas: Some(f64::from(priority_gwei)),
            ..FeeOverrides::default()
        };

        let resolved = block_on_resolve(fee_data, overrides);
        prop_assert_eq!(resolved.max_fee_per_gas(), Some(network_max_fee));
        prop_assert_eq!(
            resolved.max_priority_fee_per_gas(),
            Some(u128::from(priority_gwei) * 1_000_000_000)
        );
    }
}
