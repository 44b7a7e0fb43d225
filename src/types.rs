/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Defines common data structures to be used inside this library, or from outside application.

use std::fmt;

use num_bigint::BigUint;

use crate::serialization::{blake2b_256, Serializable};

/// Address of an account. The shard an account lives in is a function of its address.
pub type Address = [u8; 32];

/// Hash of a transaction or a smart contract result.
pub type Hash = [u8; 32];

/// Identifier of a shard.
pub type ShardId = u32;

/// Length of an [Address] in bytes.
pub const ADDRESS_LENGTH: usize = 32;

/// A transaction submitted by a user account.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transaction {
    pub nonce: u64,
    pub value: BigUint,
    pub receiver: Address,
    pub sender: Address,
    pub gas_price: u64,
    pub gas_limit: u64,
    /// Opaque payload. Encodes a contract call, a deployment or a relayed envelope.
    pub data: Vec<u8>,
}

impl Transaction {
    /// Blake2b-256 of the canonical serialization.
    pub fn hash(&self) -> Hash {
        blake2b_256(&self.serialize())
    }
}

/// SmartContractResult is a system generated transaction which continues the execution of a
/// transaction on another shard (or returns gas and errors to the shard it came from).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SmartContractResult {
    pub nonce: u64,
    pub value: BigUint,
    pub receiver: Address,
    pub sender: Address,
    /// Call data of a chained call, an envelope of a relayed inner transaction, or
    /// `@`-prefixed return data / error payload.
    pub data: Vec<u8>,
    /// Hash of the transaction or result which produced this result.
    pub prev_tx_hash: Hash,
    /// Hash of the user transaction at the root of the chain.
    pub original_tx_hash: Hash,
    /// Gas still available to the continuation.
    pub gas_limit: u64,
    pub gas_price: u64,
    pub original_sender: Address,
    /// Account which paid the gas for the chain, if it is not the original sender.
    pub relayer: Option<Address>,
    pub is_refund: bool,
}

impl SmartContractResult {
    /// Blake2b-256 of the canonical serialization.
    pub fn hash(&self) -> Hash {
        blake2b_256(&self.serialize())
    }

    /// Account that receives unused gas of the chain this result belongs to.
    pub fn refund_recipient(&self) -> Address {
        self.relayer.unwrap_or(self.original_sender)
    }
}

/// ReturnCode is the outcome of an execution. Validation failures are not return codes,
/// they are reported as [crate::ProcessError].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReturnCode {
    Ok,
    FunctionNotFound,
    ContractNotFound,
    ContractInvalid,
    UserError,
    OutOfGas,
    OutOfFunds,
    ExecutionFailed,
}

impl ReturnCode {
    pub fn is_ok(&self) -> bool {
        matches!(self, ReturnCode::Ok)
    }

    /// The code reported to callers of the processor. Contract level failures that are not
    /// about funds or the execution environment are all user errors.
    pub fn as_process_code(self) -> ReturnCode {
        match self {
            ReturnCode::Ok => ReturnCode::Ok,
            ReturnCode::OutOfFunds => ReturnCode::OutOfFunds,
            ReturnCode::ExecutionFailed => ReturnCode::ExecutionFailed,
            ReturnCode::FunctionNotFound
            | ReturnCode::ContractNotFound
            | ReturnCode::ContractInvalid
            | ReturnCode::UserError
            | ReturnCode::OutOfGas => ReturnCode::UserError,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ReturnCode::Ok => "ok",
            ReturnCode::FunctionNotFound => "function not found",
            ReturnCode::ContractNotFound => "contract not found",
            ReturnCode::ContractInvalid => "contract invalid",
            ReturnCode::UserError => "user error",
            ReturnCode::OutOfGas => "out of gas",
            ReturnCode::OutOfFunds => "out of funds",
            ReturnCode::ExecutionFailed => "execution failed",
        }
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn process_code_folds_contract_failures_into_user_error() {
        assert_eq!(ReturnCode::FunctionNotFound.as_process_code(), ReturnCode::UserError);
        assert_eq!(ReturnCode::OutOfGas.as_process_code(), ReturnCode::UserError);
        assert_eq!(ReturnCode::OutOfFunds.as_process_code(), ReturnCode::OutOfFunds);
        assert_eq!(ReturnCode::ExecutionFailed.as_process_code(), ReturnCode::ExecutionFailed);
        assert_eq!(ReturnCode::Ok.as_process_code(), ReturnCode::Ok);
    }

    #[test]
    fn refund_goes_to_relayer_when_present() {
        let mut scr = SmartContractResult {
            original_sender: [1u8; 32],
            ..Default::default()
        };
        assert_eq!(scr.refund_recipient(), [1u8; 32]);
        scr.relayer = Some([2u8; 32]);
        assert_eq!(scr.refund_recipient(), [2u8; 32]);
    }
}
