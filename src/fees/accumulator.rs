/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Per block accumulation of fees.

use std::collections::HashMap;

use num_bigint::BigUint;
use num_traits::Zero;

use crate::types::Hash;

/// Fees contributed by one transaction or result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct FeeContribution {
    fee: BigUint,
    developer_fee: BigUint,
}

/// FeeAccumulator sums up fees collected in a block. Accumulated fees include the developer
/// share, which is also summed up separately.
///
/// The totals always equal the sum of the contributions recorded for the hashes that have not
/// been reverted.
#[derive(Clone, Debug, Default)]
pub struct FeeAccumulator {
    accumulated_fees: BigUint,
    developer_fees: BigUint,
    contributions: HashMap<Hash, FeeContribution>,
}

impl FeeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the totals and the recorded contributions.
    pub fn create_block_started(&mut self) {
        self.accumulated_fees = BigUint::zero();
        self.developer_fees = BigUint::zero();
        self.contributions.clear();
    }

    /// Adds the fee collected for `hash`. Contributions of the same hash add up.
    pub fn process_transaction_fee(&mut self, cost: BigUint, developer_fee: BigUint, hash: Hash) {
        if cost.is_zero() && developer_fee.is_zero() {
            return;
        }
        log::trace!(
            "fee {} (developer {}) for {}",
            cost,
            developer_fee,
            hex::encode(hash)
        );

        self.accumulated_fees += &cost;
        self.developer_fees += &developer_fee;

        let contribution = self.contributions.entry(hash).or_default();
        contribution.fee += cost;
        contribution.developer_fee += developer_fee;
    }

    /// Subtracts the contributions of `hashes`. Unknown hashes, and hashes already reverted,
    /// are ignored.
    pub fn revert_fees(&mut self, hashes: &[Hash]) {
        for hash in hashes {
            if let Some(contribution) = self.contributions.remove(hash) {
                log::debug!("revert fee {} of {}", contribution.fee, hex::encode(hash));
                self.accumulated_fees -= contribution.fee;
                self.developer_fees -= contribution.developer_fee;
            }
        }
    }

    pub fn accumulated_fees(&self) -> &BigUint {
        &self.accumulated_fees
    }

    pub fn developer_fees(&self) -> &BigUint {
        &self.developer_fees
    }

    /// Fee and developer fee recorded for `hash`.
    pub fn contribution(&self, hash: &Hash) -> Option<(&BigUint, &BigUint)> {
        self.contributions
            .get(hash)
            .map(|c| (&c.fee, &c.developer_fee))
    }
}
