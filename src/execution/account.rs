/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Execution of transactions after Pre-Charge: move balance, contract deployment and contract call.
//!
//! The sender has already been debited for value and the whole gas limit, and the data has been
//! decoded. Each function here delivers the value, settles the gas and accumulates the fee for the
//! transaction hash.

use crate::{
    address::new_contract_address,
    error::ProcessError,
    execution::call_data::{CallData, DeployData},
    ledger::AccountsAdapter,
    types::{Hash, ReturnCode, Transaction},
    vm::{CallKind, VmInput},
};

use super::{
    contract, phase,
    state::{ExecutionState, ResultOrigin},
};

/// Execution of a move balance transaction. The cost is known upfront, so unused gas is returned
/// right away.
pub(crate) fn move_balance<A>(
    state: &mut ExecutionState<A>,
    tx: &Transaction,
    hash: Hash,
    origin: &ResultOrigin,
) -> ReturnCode
where
    A: AccountsAdapter + ?Sized,
{
    let gas_used = state.economics.compute_gas_limit(tx);
    let fee = state.economics.compute_fee(tx);

    if state.is_local(&tx.receiver) {
        state.credit(&tx.receiver, &tx.value);
    } else {
        state.emit(origin.result(
            tx.sender,
            tx.receiver,
            tx.value.clone(),
            tx.data.clone(),
            0,
        ));
    }

    phase::charge(
        state,
        origin,
        &tx.sender,
        tx.gas_limit.saturating_sub(gas_used),
        fee,
        hash,
    );
    ReturnCode::Ok
}

/// Execution of a contract deployment. The contract is created in the shard of the sender.
pub(crate) fn deploy<A>(
    state: &mut ExecutionState<A>,
    tx: &Transaction,
    hash: Hash,
    origin: &ResultOrigin,
    deploy: DeployData,
) -> Result<ReturnCode, ProcessError>
where
    A: AccountsAdapter + ?Sized,
{
    let move_balance_gas = state.economics.compute_gas_limit(tx);
    let move_balance_fee = state.economics.compute_fee(tx);

    let input = VmInput {
        caller: tx.sender,
        recipient: new_contract_address(&tx.sender, tx.nonce, deploy.vm_type),
        call_value: tx.value.clone(),
        arguments: deploy.arguments,
        gas_provided: tx.gas_limit.saturating_sub(move_balance_gas),
        gas_price: tx.gas_price,
        original_tx_hash: origin.original_tx_hash,
        kind: CallKind::Deploy {
            code: deploy.code,
            vm_type: deploy.vm_type,
        },
    };
    log::debug!("deploy contract {}", hex::encode(input.recipient));
    contract::execute(state, input, origin, move_balance_fee, hash)
}

/// Execution of a call of a contract in this shard.
pub(crate) fn call<A>(
    state: &mut ExecutionState<A>,
    tx: &Transaction,
    hash: Hash,
    origin: &ResultOrigin,
    call: CallData,
) -> Result<ReturnCode, ProcessError>
where
    A: AccountsAdapter + ?Sized,
{
    let move_balance_gas = state.economics.compute_gas_limit(tx);
    let move_balance_fee = state.economics.compute_fee(tx);

    let input = VmInput {
        caller: tx.sender,
        recipient: tx.receiver,
        call_value: tx.value.clone(),
        arguments: call.arguments,
        gas_provided: tx.gas_limit.saturating_sub(move_balance_gas),
        gas_price: tx.gas_price,
        original_tx_hash: origin.original_tx_hash,
        kind: CallKind::Call {
            function: call.function,
        },
    };
    contract::execute(state, input, origin, move_balance_fee, hash)
}

/// A call of a contract in another shard is sent as a result carrying the value, the call data
/// and the gas left after the move balance cost.
pub(crate) fn remote_call<A>(
    state: &mut ExecutionState<A>,
    tx: &Transaction,
    hash: Hash,
    origin: &ResultOrigin,
) -> ReturnCode
where
    A: AccountsAdapter + ?Sized,
{
    let move_balance_gas = state.economics.compute_gas_limit(tx);
    let move_balance_fee = state.economics.compute_fee(tx);

    state.emit(origin.result(
        tx.sender,
        tx.receiver,
        tx.value.clone(),
        tx.data.clone(),
        tx.gas_limit.saturating_sub(move_balance_gas),
    ));
    state.accumulate_fee(move_balance_fee, Default::default(), hash);
    ReturnCode::Ok
}
