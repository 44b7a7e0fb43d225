/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Processing of smart contract results received by this shard.
//!
//! A result is one of:
//! - a refund of unused gas, credited to its receiver,
//! - the funding of a relayed inner transaction, see [relayed](crate::execution::relayed),
//! - return data or an error payload (data starting with `@`), or a plain transfer, credited to
//! its receiver. Gas carried by such a result is returned to the refund recipient,
//! - a call of a contract in this shard, executed with the gas the result carries.
//!
//! Results produced while processing which are addressed to this shard are applied right away, in
//! the order they were created. Results for other shards wait in the block outbox.

use num_bigint::BigUint;

use crate::{
    address::is_smart_contract_address,
    error::ProcessError,
    execution::call_data::{is_return_data, parse_call_data},
    gas,
    ledger::AccountsAdapter,
    types::{ReturnCode, SmartContractResult},
    vm::{CallKind, VmInput},
};

use super::{
    contract::{self, FailedExecution},
    relayed::{self, is_relayed_data},
    state::{ExecutionState, ResultOrigin},
};

/// Backbone logic of result processing. The receiver must live in this shard.
pub(crate) fn execute_result<A>(
    state: &mut ExecutionState<A>,
    scr: &SmartContractResult,
) -> Result<ReturnCode, ProcessError>
where
    A: AccountsAdapter + ?Sized,
{
    let receiver_shard = state.shard.compute_id(&scr.receiver);
    let self_shard = state.shard.self_id();
    if receiver_shard != self_shard {
        return Err(ProcessError::ReceiverNotInShard {
            receiver_shard,
            self_shard,
        });
    }

    let return_code = process_result(state, scr)?;
    drain_local_results(state)?;
    Ok(return_code)
}

/// Applies the results queued for this shard until none is left.
pub(crate) fn drain_local_results<A>(state: &mut ExecutionState<A>) -> Result<(), ProcessError>
where
    A: AccountsAdapter + ?Sized,
{
    while let Some(scr) = state.local_results.pop_front() {
        let return_code = process_result(state, &scr)?;
        log::trace!(
            "local result {} processed with {}",
            hex::encode(scr.hash()),
            return_code
        );
    }
    Ok(())
}

fn process_result<A>(
    state: &mut ExecutionState<A>,
    scr: &SmartContractResult,
) -> Result<ReturnCode, ProcessError>
where
    A: AccountsAdapter + ?Sized,
{
    let hash = scr.hash();

    if scr.is_refund {
        log::debug!(
            "refund {} to {}",
            scr.value,
            hex::encode(scr.receiver)
        );
        state.credit(&scr.receiver, &scr.value);
        return Ok(ReturnCode::Ok);
    }

    if scr.relayer.is_some() && is_relayed_data(&scr.data) {
        return relayed::process_relayed_result(state, scr, hash);
    }

    let origin = ResultOrigin::from_result(scr, hash);

    if scr.data.is_empty()
        || is_return_data(&scr.data)
        || !is_smart_contract_address(&scr.receiver)
    {
        state.credit(&scr.receiver, &scr.value);
        // no contract runs, the gas paid for by the sender goes back
        if scr.gas_limit > 0 {
            let refund = gas::fee_for_gas(scr.gas_price, scr.gas_limit);
            log::debug!(
                "return {} of unused gas to {}",
                refund,
                hex::encode(origin.refund_recipient())
            );
            state.emit(origin.refund(scr.receiver, refund));
        }
        return Ok(ReturnCode::Ok);
    }

    let call = match parse_call_data(&scr.data) {
        Ok(call) => call,
        Err(err) => {
            return Ok(contract::fail_execution(
                state,
                &origin,
                FailedExecution {
                    from: scr.receiver,
                    to: scr.sender,
                    value: scr.value.clone(),
                    fee: gas::fee_for_gas(scr.gas_price, scr.gas_limit),
                    hash,
                    return_code: ReturnCode::UserError,
                    message: &err.to_string(),
                },
            ))
        }
    };

    let input = VmInput {
        caller: scr.sender,
        recipient: scr.receiver,
        call_value: scr.value.clone(),
        arguments: call.arguments,
        gas_provided: scr.gas_limit,
        gas_price: scr.gas_price,
        original_tx_hash: scr.original_tx_hash,
        kind: CallKind::Call {
            function: call.function,
        },
    };
    contract::execute(state, input, &origin, BigUint::default(), hash)
}
