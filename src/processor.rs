/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! processor defines the entry points of a shard: processing of transactions and of smart
//! contract results, with the collaborators injected through [TxProcessorBuilder].

use std::sync::Arc;

use crate::{
    block::BlockContext,
    error::{ConfigError, ProcessError, StateError},
    execution::{execute, results, state::ExecutionState},
    fees::EconomicsHandler,
    ledger::AccountsAdapter,
    query::ScQueryService,
    sharding::ShardCoordinator,
    types::{Hash, ReturnCode, ShardId, SmartContractResult, Transaction},
    vm::VirtualMachine,
};

/// TxProcessor processes transactions and smart contract results of one shard. It owns the
/// account ledger of the shard. Fees and outgoing results are collected in the [BlockContext]
/// passed to each call.
pub struct TxProcessor<A: AccountsAdapter> {
    accounts: A,
    vm: Arc<dyn VirtualMachine>,
    shard_coordinator: Arc<dyn ShardCoordinator>,
    economics: Arc<dyn EconomicsHandler>,
}

impl<A: AccountsAdapter> TxProcessor<A> {
    pub fn builder() -> TxProcessorBuilder<A> {
        TxProcessorBuilder::new()
    }

    /// Validates and executes a transaction sent from an account of this shard.
    ///
    /// Returns an error if the transaction is rejected; the ledger is then unchanged. Otherwise
    /// the transaction is charged and the return code tells whether its execution succeeded.
    pub fn process_transaction(
        &mut self,
        block: &mut BlockContext,
        tx: &Transaction,
    ) -> Result<ReturnCode, ProcessError> {
        let mut state = ExecutionState::new(
            &mut self.accounts,
            self.vm.as_ref(),
            self.shard_coordinator.as_ref(),
            self.economics.as_ref(),
            block,
        );
        let result = execute::execute_transaction(&mut state, tx);
        if let Err(err) = &result {
            log::debug!("transaction {} rejected: {}", hex::encode(tx.hash()), err);
        }
        result
    }

    /// Processes a result addressed to an account of this shard.
    pub fn process_smart_contract_result(
        &mut self,
        block: &mut BlockContext,
        scr: &SmartContractResult,
    ) -> Result<ReturnCode, ProcessError> {
        let mut state = ExecutionState::new(
            &mut self.accounts,
            self.vm.as_ref(),
            self.shard_coordinator.as_ref(),
            self.economics.as_ref(),
            block,
        );
        results::execute_result(&mut state, scr)
    }

    /// Processes the results included in a block, in inclusion order.
    pub fn process_block_results<I>(
        &mut self,
        block: &mut BlockContext,
        scrs: I,
    ) -> Vec<Result<ReturnCode, ProcessError>>
    where
        I: IntoIterator<Item = SmartContractResult>,
    {
        scrs.into_iter()
            .map(|scr| self.process_smart_contract_result(block, &scr))
            .collect()
    }

    /// Query service reading the ledger of this shard.
    pub fn query_service(&self) -> ScQueryService<'_> {
        ScQueryService::new(&self.accounts, self.vm.as_ref(), self.economics.as_ref())
    }

    pub fn accounts(&self) -> &A {
        &self.accounts
    }

    pub fn accounts_mut(&mut self) -> &mut A {
        &mut self.accounts
    }

    pub fn commit(&mut self) -> Result<Hash, StateError> {
        self.accounts.commit()
    }

    pub fn shard_id(&self) -> ShardId {
        self.shard_coordinator.self_id()
    }

    pub fn shard_coordinator(&self) -> &dyn ShardCoordinator {
        self.shard_coordinator.as_ref()
    }

    pub fn economics(&self) -> &dyn EconomicsHandler {
        self.economics.as_ref()
    }
}

/// TxProcessorBuilder collects the collaborators of a [TxProcessor].
pub struct TxProcessorBuilder<A: AccountsAdapter> {
    accounts: Option<A>,
    vm: Option<Arc<dyn VirtualMachine>>,
    shard_coordinator: Option<Arc<dyn ShardCoordinator>>,
    economics: Option<Arc<dyn EconomicsHandler>>,
}

impl<A: AccountsAdapter> Default for TxProcessorBuilder<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: AccountsAdapter> TxProcessorBuilder<A> {
    pub fn new() -> Self {
        Self {
            accounts: None,
            vm: None,
            shard_coordinator: None,
            economics: None,
        }
    }

    /// specify the account ledger of the shard.
    pub fn set_accounts(mut self, accounts: A) -> Self {
        self.accounts = Some(accounts);
        self
    }

    /// specify the virtual machine executing contracts.
    pub fn set_virtual_machine(mut self, vm: Arc<dyn VirtualMachine>) -> Self {
        self.vm = Some(vm);
        self
    }

    /// specify the shard routing. Its self id is the shard being processed.
    pub fn set_shard_coordinator(mut self, shard_coordinator: Arc<dyn ShardCoordinator>) -> Self {
        self.shard_coordinator = Some(shard_coordinator);
        self
    }

    /// specify the fee schedule.
    pub fn set_economics(mut self, economics: Arc<dyn EconomicsHandler>) -> Self {
        self.economics = Some(economics);
        self
    }

    pub fn build(self) -> Result<TxProcessor<A>, ConfigError> {
        Ok(TxProcessor {
            accounts: self.accounts.ok_or(ConfigError::MissingAccounts)?,
            vm: self.vm.ok_or(ConfigError::MissingVirtualMachine)?,
            shard_coordinator: self
                .shard_coordinator
                .ok_or(ConfigError::MissingShardCoordinator)?,
            economics: self.economics.ok_or(ConfigError::MissingEconomics)?,
        })
    }
}
