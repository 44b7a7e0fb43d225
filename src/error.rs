/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! error defines sets of error definitions in entire life time of transaction processing.
//!
//! Only validation failures are errors. A transaction which passes validation is processed and
//! its outcome is a [ReturnCode](crate::types::ReturnCode), even if the execution failed.

use num_bigint::BigUint;

use crate::types::ShardId;

/// Descriptive errors of rejected transactions and results. A rejected transaction leaves
/// the ledger untouched and is not charged.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// Sender of the transaction does not live in this shard.
    #[error("sender belongs to shard {sender_shard}, this is shard {self_shard}")]
    SenderNotInShard {
        sender_shard: ShardId,
        self_shard: ShardId,
    },

    /// Receiver of a smart contract result does not live in this shard.
    #[error("result receiver belongs to shard {receiver_shard}, this is shard {self_shard}")]
    ReceiverNotInShard {
        receiver_shard: ShardId,
        self_shard: ShardId,
    },

    /// Nonce is not current nonce.
    #[error("wrong nonce: expected {expected}, got {got}")]
    WrongNonce { expected: u64, got: u64 },

    /// Not enough balance to pay for value and gas limit.
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: BigUint,
        available: BigUint,
    },

    #[error("gas price {got} is lower than the minimum {min}")]
    InsufficientGasPrice { min: u64, got: u64 },

    /// Gas limit was insufficient to cover the move balance cost.
    #[error("gas limit {got} is lower than the required {required}")]
    InsufficientGasLimit { required: u64, got: u64 },

    #[error("gas limit {got} is higher than the block maximum {max}")]
    GasLimitTooHigh { max: u64, got: u64 },

    /// Data of a deployment or a contract call cannot be parsed.
    #[error("malformed data: {0}")]
    MalformedData(#[from] CallDataError),

    #[error("relayed transaction: {0}")]
    RelayedTx(#[from] RelayedTxError),

    /// Query execution returned a non-Ok code.
    #[error("query failed with {code}: {message}")]
    QueryFailed {
        code: crate::types::ReturnCode,
        message: String,
    },

    #[error(transparent)]
    VirtualMachine(#[from] anyhow::Error),
}

/// Errors on decoding the canonical serialization of transactions and results.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("protobuf: {0}")]
    Protobuf(#[from] prost::DecodeError),

    #[error("field {field} must be 32 bytes long, got {len}")]
    InvalidAddressLength { field: &'static str, len: usize },

    #[error("field {field} is not a valid non-negative big integer")]
    InvalidBigInt { field: &'static str },
}

/// Errors on unwrapping and checking a relayed transaction.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RelayedTxError {
    #[error("data does not start with the relayed transaction marker")]
    MissingMarker,

    #[error("inner transaction is not valid hex: {0}")]
    MalformedHex(#[from] hex::FromHexError),

    #[error("inner transaction cannot be decoded: {0}")]
    Decode(#[from] DecodeError),

    /// Inner sender must be the receiver of the relayed transaction.
    #[error("inner sender does not match the relayed transaction receiver")]
    BeneficiaryMismatch,

    #[error("inner value does not match the relayed transaction value")]
    ValueMismatch,

    #[error("inner gas price does not match the relayed transaction gas price")]
    GasPriceMismatch,

    #[error("relayed transaction leaves {available} gas but the inner transaction requires {required}")]
    GasLimitMismatch { available: u64, required: u64 },

    #[error("relayed transactions cannot be nested")]
    RecursiveRelay,
}

/// Errors on parsing `@`-separated call and deploy data.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CallDataError {
    #[error("empty data")]
    EmptyData,

    #[error("function name is missing or not valid utf-8")]
    InvalidFunctionName,

    #[error("argument {index} is not valid hex")]
    InvalidHexArgument { index: usize },

    #[error("contract code is missing")]
    MissingCode,

    #[error("vm type must be 2 bytes")]
    InvalidVmType,
}

/// Errors reported by the account ledger.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("commit failed: {0}")]
    Commit(String),
}

/// Construction time errors of processors and their collaborators.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("account ledger is missing")]
    MissingAccounts,

    #[error("virtual machine is missing")]
    MissingVirtualMachine,

    #[error("shard coordinator is missing")]
    MissingShardCoordinator,

    #[error("economics handler is missing")]
    MissingEconomics,

    #[error("developer percentage {0} is outside [0, 1]")]
    InvalidDeveloperPercentage(f64),

    #[error("min gas limit must be greater than zero")]
    ZeroMinGasLimit,

    #[error("number of shards must be between 1 and 2^31")]
    InvalidNumberOfShards,

    #[error("shard {self_id} is out of range for {number_of_shards} shards")]
    InvalidSelfShard {
        self_id: u32,
        number_of_shards: u32,
    },
}
