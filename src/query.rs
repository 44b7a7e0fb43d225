/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Read-only execution of contracts.
//!
//! A query runs a contract function against the current ledger. Its output is returned as it is,
//! nothing is applied and nothing is charged.

use num_bigint::BigUint;

use crate::{
    error::ProcessError,
    execution::call_data::parse_call_data,
    fees::EconomicsHandler,
    ledger::AccountsAdapter,
    types::{Address, Transaction},
    vm::{CallKind, VirtualMachine, VmInput, VmOutput},
};

/// A call of a contract function for reading.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScQuery {
    pub contract: Address,
    pub function: String,
    pub arguments: Vec<Vec<u8>>,
    /// Caller seen by the contract. The contract itself if None.
    pub caller: Option<Address>,
}

/// ScQueryService executes queries with the collaborators of a processor.
pub struct ScQueryService<'a> {
    accounts: &'a dyn AccountsAdapter,
    vm: &'a dyn VirtualMachine,
    economics: &'a dyn EconomicsHandler,
}

impl<'a> ScQueryService<'a> {
    pub fn new(
        accounts: &'a dyn AccountsAdapter,
        vm: &'a dyn VirtualMachine,
        economics: &'a dyn EconomicsHandler,
    ) -> Self {
        Self {
            accounts,
            vm,
            economics,
        }
    }

    /// Executes the query with the block gas limit. A non-Ok return code is an error.
    pub fn execute_query(&self, query: &ScQuery) -> Result<VmOutput, ProcessError> {
        self.execute_query_with_value(query, BigUint::default())
    }

    /// Executes the query as if `call_value` was sent along.
    pub fn execute_query_with_value(
        &self,
        query: &ScQuery,
        call_value: BigUint,
    ) -> Result<VmOutput, ProcessError> {
        let input = VmInput {
            caller: query.caller.unwrap_or(query.contract),
            recipient: query.contract,
            call_value,
            arguments: query.arguments.clone(),
            gas_provided: self.economics.max_gas_limit_per_block(),
            gas_price: 0,
            original_tx_hash: [0u8; 32],
            kind: CallKind::Call {
                function: query.function.clone(),
            },
        };
        self.run(&input)
    }

    /// Estimates the gas limit a contract call transaction needs: its move balance gas plus
    /// the gas the contract uses, including gas forwarded to other contracts.
    pub fn compute_sc_call_gas_limit(&self, tx: &Transaction) -> Result<u64, ProcessError> {
        let call = parse_call_data(&tx.data)?;
        let gas_provided = self.economics.max_gas_limit_per_block();
        let input = VmInput {
            caller: tx.sender,
            recipient: tx.receiver,
            call_value: tx.value.clone(),
            arguments: call.arguments,
            gas_provided,
            gas_price: tx.gas_price,
            original_tx_hash: [0u8; 32],
            kind: CallKind::Call {
                function: call.function,
            },
        };
        let output = self.run(&input)?;
        let gas_used = gas_provided.saturating_sub(output.gas_remaining);
        Ok(self
            .economics
            .compute_gas_limit(tx)
            .saturating_add(gas_used))
    }

    fn run(&self, input: &VmInput) -> Result<VmOutput, ProcessError> {
        let output = self.vm.execute(input, self.accounts)?;
        if !output.return_code.is_ok() {
            return Err(ProcessError::QueryFailed {
                code: output.return_code,
                message: output.return_message,
            });
        }
        Ok(output)
    }
}
