/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Defines a struct as Execution State which is being updated during processing of a transaction
//! or a smart contract result.
//!
//! This state is not as same as the concept of state in the account ledger. Execution state
//! encapsulates the collaborators and the changing information during the processing life-cycle.

use std::collections::VecDeque;

use num_bigint::BigUint;

use crate::{
    block::BlockContext,
    fees::EconomicsHandler,
    ledger::AccountsAdapter,
    sharding::ShardCoordinator,
    types::{Address, Hash, SmartContractResult, Transaction},
    vm::VirtualMachine,
};

/// ExecutionState is a collection of all useful information required to process a transaction
/// and the results it produces in this shard.
pub(crate) struct ExecutionState<'a, A: AccountsAdapter + ?Sized> {
    /*** Collaborators ***/
    pub accounts: &'a mut A,
    pub vm: &'a dyn VirtualMachine,
    pub shard: &'a dyn ShardCoordinator,
    pub economics: &'a dyn EconomicsHandler,

    /*** Block ***/
    /// Fees and outgoing results of the block being processed
    pub block: &'a mut BlockContext,

    /*** Local Results ***/
    /// Results addressed to this shard. They are processed right after the operation which
    /// produced them, in creation order.
    pub local_results: VecDeque<SmartContractResult>,
}

impl<'a, A: AccountsAdapter + ?Sized> ExecutionState<'a, A> {
    pub fn new(
        accounts: &'a mut A,
        vm: &'a dyn VirtualMachine,
        shard: &'a dyn ShardCoordinator,
        economics: &'a dyn EconomicsHandler,
        block: &'a mut BlockContext,
    ) -> Self {
        Self {
            accounts,
            vm,
            shard,
            economics,
            block,
            local_results: VecDeque::new(),
        }
    }

    pub fn is_local(&self, address: &Address) -> bool {
        self.shard.is_local(address)
    }

    /// Routes a result: results for this shard are queued, the others go to the block outbox.
    pub fn emit(&mut self, scr: SmartContractResult) {
        let destination = self.shard.compute_id(&scr.receiver);
        if destination == self.shard.self_id() {
            log::trace!("queue local result {}", hex::encode(scr.hash()));
            self.local_results.push_back(scr);
        } else {
            self.block.outbox.forward(destination, scr);
        }
    }

    pub fn credit(&mut self, address: &Address, value: &BigUint) {
        let mut account = self.accounts.load_or_create(address);
        account.balance += value;
        self.accounts.save_account(account);
    }

    pub fn accumulate_fee(&mut self, fee: BigUint, developer_fee: BigUint, hash: Hash) {
        self.block.fees.process_transaction_fee(fee, developer_fee, hash);
    }
}

/// ResultOrigin describes the operation which produces smart contract results: the values the
/// results inherit from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ResultOrigin {
    pub nonce: u64,
    /// Hash of the transaction or result being processed
    pub prev_tx_hash: Hash,
    /// Hash of the user transaction at the root of the chain
    pub original_tx_hash: Hash,
    pub original_sender: Address,
    pub relayer: Option<Address>,
    pub gas_price: u64,
}

impl ResultOrigin {
    pub fn from_transaction(tx: &Transaction, tx_hash: Hash) -> Self {
        Self {
            nonce: tx.nonce,
            prev_tx_hash: tx_hash,
            original_tx_hash: tx_hash,
            original_sender: tx.sender,
            relayer: None,
            gas_price: tx.gas_price,
        }
    }

    pub fn from_result(scr: &SmartContractResult, scr_hash: Hash) -> Self {
        Self {
            nonce: scr.nonce,
            prev_tx_hash: scr_hash,
            original_tx_hash: scr.original_tx_hash,
            original_sender: scr.original_sender,
            relayer: scr.relayer,
            gas_price: scr.gas_price,
        }
    }

    /// Inner transaction of a relayed transaction. Its chain keeps the relayed transaction as
    /// root, and refunds go to the relayer.
    pub fn from_inner_transaction(inner: &Transaction, inner_hash: Hash, funding: &SmartContractResult) -> Self {
        Self {
            nonce: inner.nonce,
            prev_tx_hash: inner_hash,
            original_tx_hash: funding.original_tx_hash,
            original_sender: inner.sender,
            relayer: funding.relayer,
            gas_price: inner.gas_price,
        }
    }

    /// Account that receives unused gas.
    pub fn refund_recipient(&self) -> Address {
        self.relayer.unwrap_or(self.original_sender)
    }

    /// A result carrying `value`, `data` and `gas_limit` from `sender` to `receiver`.
    pub fn result(
        &self,
        sender: Address,
        receiver: Address,
        value: BigUint,
        data: Vec<u8>,
        gas_limit: u64,
    ) -> SmartContractResult {
        SmartContractResult {
            nonce: self.nonce,
            value,
            receiver,
            sender,
            data,
            prev_tx_hash: self.prev_tx_hash,
            original_tx_hash: self.original_tx_hash,
            gas_limit,
            gas_price: self.gas_price,
            original_sender: self.original_sender,
            relayer: self.relayer,
            is_refund: false,
        }
    }

    /// A result returning `value` of unused gas to the refund recipient.
    pub fn refund(&self, sender: Address, value: BigUint) -> SmartContractResult {
        SmartContractResult {
            is_refund: true,
            ..self.result(sender, self.refund_recipient(), value, Vec::new(), 0)
        }
    }
}
