/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Defines formulas in calculation of gas and fees.
//!
//! The mapping of equations or variables to this module is as following:
//!
//! |Name           | Related Function / Constants  |
//! |:---           |:---                           |
//! |G_min          | [MIN_GAS_LIMIT]               |
//! |G_txdata       | [GAS_PER_DATA_BYTE]           |
//! |G_movebalance  | [move_balance_gas]            |
//! |P_min          | [MIN_GAS_PRICE]               |
//! |G_block        | [MAX_GAS_LIMIT_PER_BLOCK]     |
//! |F             | [fee_for_gas]                 |
//! |F_dev          | [developer_fee]               |
//!

use num_bigint::BigUint;

/* ↓↓↓ Default economics ↓↓↓ */

/// Gas charged for including any transaction.
pub const MIN_GAS_LIMIT: u64 = 1;

/// Gas charged per byte of transaction data.
pub const GAS_PER_DATA_BYTE: u64 = 1;

pub const MIN_GAS_PRICE: u64 = 1;

pub const MAX_GAS_LIMIT_PER_BLOCK: u64 = 1_500_000_000;

/// Share of the fee for gas consumed by a contract that is accrued to the contract.
pub const DEVELOPER_PERCENTAGE: f64 = 0.1;

/// Developer percentage is applied in parts per million.
pub const PARTS_PER_MILLION: u64 = 1_000_000;

/* ↓↓↓ Formulas ↓↓↓ */

/// Gas for including a transaction with `data_len` bytes of data. It is the whole cost of a
/// move balance transaction, and the minimum gas limit of any transaction.
pub fn move_balance_gas(min_gas_limit: u64, gas_per_data_byte: u64, data_len: usize) -> u64 {
    min_gas_limit.saturating_add(gas_per_data_byte.saturating_mul(data_len as u64))
}

/// Fee paid for `gas` at `gas_price`.
pub fn fee_for_gas(gas_price: u64, gas: u64) -> BigUint {
    BigUint::from(gas_price) * BigUint::from(gas)
}

/// How the developer share of a fee is rounded to an integer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeveloperFeeRounding {
    /// Round towards zero.
    #[default]
    Floor,
    /// Round half up.
    Round,
}

/// Converts a percentage in `[0, 1]` to parts per million.
pub fn percentage_to_ppm(percentage: f64) -> u64 {
    (percentage * PARTS_PER_MILLION as f64).round() as u64
}

/// Developer share of `fee` given the percentage in parts per million.
pub fn developer_fee(fee: &BigUint, percentage_ppm: u64, rounding: DeveloperFeeRounding) -> BigUint {
    let scaled = fee * BigUint::from(percentage_ppm);
    let scaled = match rounding {
        DeveloperFeeRounding::Floor => scaled,
        DeveloperFeeRounding::Round => scaled + BigUint::from(PARTS_PER_MILLION / 2),
    };
    scaled / BigUint::from(PARTS_PER_MILLION)
}
