/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Economics of transaction processing.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::{
    error::{ConfigError, ProcessError},
    gas::{self, DeveloperFeeRounding},
    types::Transaction,
};

/// EconomicsHandler computes what a transaction costs and checks that its gas values are
/// acceptable.
pub trait EconomicsHandler: Send + Sync {
    /// Share of the VM-attributable fee that is accrued to the contract developer, in `[0, 1]`.
    fn developer_percentage(&self) -> f64;

    fn min_gas_price(&self) -> u64;

    fn max_gas_limit_per_block(&self) -> u64;

    /// Gas for including the transaction, i.e. the move balance gas.
    fn compute_gas_limit(&self, tx: &Transaction) -> u64;

    /// Fee for including the transaction: `gas_price * compute_gas_limit(tx)`.
    fn compute_fee(&self, tx: &Transaction) -> BigUint;

    /// Developer share of a fee paid for gas consumed by a contract.
    fn developer_fee(&self, fee: &BigUint) -> BigUint;

    /// Checks gas price and gas limit of the transaction.
    fn check_validity_tx_values(&self, tx: &Transaction) -> Result<(), ProcessError>;
}

/// Configuration of [Economics].
#[derive(Clone, Debug, PartialEq)]
pub struct EconomicsConfig {
    pub min_gas_limit: u64,
    pub gas_per_data_byte: u64,
    pub min_gas_price: u64,
    pub max_gas_limit_per_block: u64,
    pub developer_percentage: f64,
    pub developer_fee_rounding: DeveloperFeeRounding,
}

impl Default for EconomicsConfig {
    fn default() -> Self {
        Self {
            min_gas_limit: gas::MIN_GAS_LIMIT,
            gas_per_data_byte: gas::GAS_PER_DATA_BYTE,
            min_gas_price: gas::MIN_GAS_PRICE,
            max_gas_limit_per_block: gas::MAX_GAS_LIMIT_PER_BLOCK,
            developer_percentage: gas::DEVELOPER_PERCENTAGE,
            developer_fee_rounding: DeveloperFeeRounding::Floor,
        }
    }
}

/// Economics is the fee schedule of a running chain.
#[derive(Clone, Debug)]
pub struct Economics {
    config: EconomicsConfig,
    developer_ppm: u64,
}

impl Economics {
    pub fn new(config: EconomicsConfig) -> Result<Self, ConfigError> {
        let percentage = config.developer_percentage;
        if !(0.0..=1.0).contains(&percentage) {
            return Err(ConfigError::InvalidDeveloperPercentage(percentage));
        }
        if config.min_gas_limit == 0 {
            return Err(ConfigError::ZeroMinGasLimit);
        }
        Ok(Self {
            developer_ppm: gas::percentage_to_ppm(percentage),
            config,
        })
    }

    pub fn config(&self) -> &EconomicsConfig {
        &self.config
    }
}

impl EconomicsHandler for Economics {
    fn developer_percentage(&self) -> f64 {
        self.config.developer_percentage
    }

    fn min_gas_price(&self) -> u64 {
        self.config.min_gas_price
    }

    fn max_gas_limit_per_block(&self) -> u64 {
        self.config.max_gas_limit_per_block
    }

    fn compute_gas_limit(&self, tx: &Transaction) -> u64 {
        gas::move_balance_gas(
            self.config.min_gas_limit,
            self.config.gas_per_data_byte,
            tx.data.len(),
        )
    }

    fn compute_fee(&self, tx: &Transaction) -> BigUint {
        gas::fee_for_gas(tx.gas_price, self.compute_gas_limit(tx))
    }

    fn developer_fee(&self, fee: &BigUint) -> BigUint {
        gas::developer_fee(fee, self.developer_ppm, self.config.developer_fee_rounding)
    }

    fn check_validity_tx_values(&self, tx: &Transaction) -> Result<(), ProcessError> {
        if tx.gas_price < self.config.min_gas_price {
            return Err(ProcessError::InsufficientGasPrice {
                min: self.config.min_gas_price,
                got: tx.gas_price,
            });
        }

        let required = self.compute_gas_limit(tx);
        if tx.gas_limit < required {
            return Err(ProcessError::InsufficientGasLimit {
                required,
                got: tx.gas_limit,
            });
        }

        if tx.gas_limit > self.config.max_gas_limit_per_block {
            return Err(ProcessError::GasLimitTooHigh {
                max: self.config.max_gas_limit_per_block,
                got: tx.gas_limit,
            });
        }
        Ok(())
    }
}

/// GenesisEconomics is the fee schedule used while processing genesis transactions. Including
/// a transaction costs no gas, there is no minimum gas price and no block gas limit.
///
/// Gas consumed by contracts is still paid at the gas price of the transaction and accumulated
/// as fee, so that balances plus fees stay constant. Genesis transactions carry a zero gas price,
/// which makes them free.
#[derive(Clone, Copy, Debug, Default)]
pub struct GenesisEconomics;

impl EconomicsHandler for GenesisEconomics {
    fn developer_percentage(&self) -> f64 {
        0.0
    }

    fn min_gas_price(&self) -> u64 {
        0
    }

    fn max_gas_limit_per_block(&self) -> u64 {
        u64::MAX
    }

    fn compute_gas_limit(&self, _tx: &Transaction) -> u64 {
        0
    }

    fn compute_fee(&self, _tx: &Transaction) -> BigUint {
        BigUint::zero()
    }

    fn developer_fee(&self, _fee: &BigUint) -> BigUint {
        BigUint::zero()
    }

    fn check_validity_tx_values(&self, _tx: &Transaction) -> Result<(), ProcessError> {
        Ok(())
    }
}
