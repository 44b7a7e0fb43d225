/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Routing of addresses to shards.
//!
//! The shard of an account is a function of the last bytes of its address. Contract addresses
//! keep the last bytes of their creator, so a contract always lives in its owner's shard.

use crate::{
    error::ConfigError,
    types::{Address, ShardId},
};

/// Largest number of shards a [MultiShardCoordinator] can mask addresses for.
pub const MAX_NUMBER_OF_SHARDS: u32 = 1 << 31;

/// ShardCoordinator tells which shard an address belongs to.
pub trait ShardCoordinator: Send + Sync {
    fn compute_id(&self, address: &Address) -> ShardId;

    fn self_id(&self) -> ShardId;

    fn number_of_shards(&self) -> u32;

    fn same_shard(&self, first: &Address, second: &Address) -> bool {
        self.compute_id(first) == self.compute_id(second)
    }

    fn is_local(&self, address: &Address) -> bool {
        self.compute_id(address) == self.self_id()
    }
}

/// MultiShardCoordinator assigns addresses to shards by masking the trailing address bytes.
///
/// With `n` shards, `bits = ceil(log2(n))`. The address suffix is masked with `2^bits - 1`.
/// If the result is not a valid shard (n is not a power of two), the suffix is masked with
/// `2^(bits-1) - 1` instead.
#[derive(Clone, Debug)]
pub struct MultiShardCoordinator {
    number_of_shards: u32,
    self_id: ShardId,
    mask_high: u32,
    mask_low: u32,
}

impl MultiShardCoordinator {
    pub fn new(number_of_shards: u32, self_id: ShardId) -> Result<Self, ConfigError> {
        if number_of_shards == 0 || number_of_shards > MAX_NUMBER_OF_SHARDS {
            return Err(ConfigError::InvalidNumberOfShards);
        }
        if self_id >= number_of_shards {
            return Err(ConfigError::InvalidSelfShard {
                self_id,
                number_of_shards,
            });
        }
        let (mask_high, mask_low) = masks(number_of_shards);
        Ok(Self {
            number_of_shards,
            self_id,
            mask_high,
            mask_low,
        })
    }
}

fn masks(number_of_shards: u32) -> (u32, u32) {
    // ceil(log2(n))
    let bits = u32::BITS - (number_of_shards - 1).leading_zeros();
    let mask_high = (1u32 << bits) - 1;
    let mask_low = match bits {
        0 => 0,
        _ => (1u32 << (bits - 1)) - 1,
    };
    (mask_high, mask_low)
}

impl ShardCoordinator for MultiShardCoordinator {
    fn compute_id(&self, address: &Address) -> ShardId {
        if self.number_of_shards == 1 {
            return 0;
        }
        let bytes_needed = (self.number_of_shards / 256 + 1) as usize;
        let suffix = address[address.len() - bytes_needed.min(address.len())..]
            .iter()
            .fold(0u32, |acc, byte| (acc << 8) | *byte as u32);

        let shard = suffix & self.mask_high;
        if shard > self.number_of_shards - 1 {
            suffix & self.mask_low
        } else {
            shard
        }
    }

    fn self_id(&self) -> ShardId {
        self.self_id
    }

    fn number_of_shards(&self) -> u32 {
        self.number_of_shards
    }
}
