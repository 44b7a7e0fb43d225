/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Address conventions of contracts.
//!
//! A contract address starts with [CONTRACT_ADDRESS_PREFIX_LENGTH] zero bytes, followed by the
//! 2 byte vm type, 20 bytes of the Keccak256 hash of the creator and its nonce, and the last
//! 2 bytes of the creator address. Keeping the creator's suffix keeps the contract in the
//! creator's shard.

use sha2::{Digest as _, Sha256};
use tiny_keccak::{Hasher as _, Keccak};

use crate::types::{Address, Hash, ADDRESS_LENGTH};

/// Number of leading zero bytes of a contract address.
pub const CONTRACT_ADDRESS_PREFIX_LENGTH: usize = 8;

const VM_TYPE_LENGTH: usize = 2;

const SHARD_SUFFIX_LENGTH: usize = 2;

/// The all-zero address is the receiver of contract deployments.
pub fn is_empty_address(address: &Address) -> bool {
    address.iter().all(|b| *b == 0)
}

pub fn is_smart_contract_address(address: &Address) -> bool {
    !is_empty_address(address)
        && address[..CONTRACT_ADDRESS_PREFIX_LENGTH]
            .iter()
            .all(|b| *b == 0)
}

/// Address of the contract deployed by `creator` with a transaction of nonce `creator_nonce`.
pub fn new_contract_address(creator: &Address, creator_nonce: u64, vm_type: [u8; 2]) -> Address {
    let mut digest = [0u8; 32];
    let mut keccak = Keccak::v256();
    keccak.update(creator);
    keccak.update(&creator_nonce.to_le_bytes());
    keccak.finalize(&mut digest);

    let hash_start = CONTRACT_ADDRESS_PREFIX_LENGTH + VM_TYPE_LENGTH;
    let suffix_start = ADDRESS_LENGTH - SHARD_SUFFIX_LENGTH;

    let mut address = [0u8; ADDRESS_LENGTH];
    address[CONTRACT_ADDRESS_PREFIX_LENGTH..hash_start].copy_from_slice(&vm_type);
    address[hash_start..suffix_start].copy_from_slice(&digest[hash_start..suffix_start]);
    address[suffix_start..].copy_from_slice(&creator[suffix_start..]);
    address
}

/// SHA256 hash of contract code.
pub fn code_hash(code: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(code);
    hasher.finalize().into()
}
