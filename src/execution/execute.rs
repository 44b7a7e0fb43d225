/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Implementation of the processing of a transaction. The process starts from validation and the
//! Pre-Charge phase, then dispatches by transaction type, and finally applies the results that
//! the execution produced for this shard.
//!
//! A transaction that fails validation is rejected with a [ProcessError] and does not change the
//! ledger. Validation includes decoding the payload: the envelope of a relayed transaction, deploy
//! data, and call data for a contract in this shard. Any transaction that passes validation is
//! charged and increments the sender nonce, whatever the return code of its execution.

use num_bigint::BigUint;

use crate::{
    error::ProcessError,
    execution::call_data::{parse_call_data, parse_deploy_data, CallData, DeployData},
    ledger::AccountsAdapter,
    types::{Hash, ReturnCode, Transaction},
};

use super::{
    account, phase, relayed, results,
    state::{ExecutionState, ResultOrigin},
    tx_type::{classify, TxType},
};

/// Decoded data of a transaction, ready for dispatch.
#[derive(Debug)]
pub(crate) enum Payload {
    MoveBalance,
    Deploy(DeployData),
    /// Call of a contract in this shard
    Call(CallData),
    /// Call of a contract in another shard. Its data is parsed there.
    RemoteCall,
    Relayed(Transaction),
}

/// Decodes the data of `tx` according to its type. Fails without touching the ledger.
pub(crate) fn decode_payload<A>(
    state: &ExecutionState<A>,
    tx: &Transaction,
) -> Result<Payload, ProcessError>
where
    A: AccountsAdapter + ?Sized,
{
    let payload = match classify(&tx.receiver, &tx.data) {
        TxType::MoveBalance => Payload::MoveBalance,
        TxType::ScDeployment => Payload::Deploy(parse_deploy_data(&tx.data)?),
        TxType::ScInvoking if state.is_local(&tx.receiver) => {
            Payload::Call(parse_call_data(&tx.data)?)
        }
        TxType::ScInvoking => Payload::RemoteCall,
        TxType::RelayedTx => Payload::Relayed(relayed::unwrap(&tx.data)?),
    };
    Ok(payload)
}

/// Backbone logic of transaction processing.
pub(crate) fn execute_transaction<A>(
    state: &mut ExecutionState<A>,
    tx: &Transaction,
) -> Result<ReturnCode, ProcessError>
where
    A: AccountsAdapter + ?Sized,
{
    // Phase: validation
    let sender_shard = state.shard.compute_id(&tx.sender);
    let self_shard = state.shard.self_id();
    if sender_shard != self_shard {
        return Err(ProcessError::SenderNotInShard {
            sender_shard,
            self_shard,
        });
    }
    state.economics.check_validity_tx_values(tx)?;
    let payload = decode_payload(state, tx)?;

    // Phase: Pre-Charge
    phase::pre_charge(state, tx, &BigUint::default())?;

    // Phase: execution
    let hash = tx.hash();
    log::debug!(
        "process transaction {} ({:?})",
        hex::encode(hash),
        classify(&tx.receiver, &tx.data)
    );
    let origin = ResultOrigin::from_transaction(tx, hash);
    let return_code = dispatch(state, tx, hash, &origin, payload)?;

    // Phase: local results
    results::drain_local_results(state)?;
    Ok(return_code)
}

/// Executes a transaction whose sender has been pre-charged.
pub(crate) fn dispatch<A>(
    state: &mut ExecutionState<A>,
    tx: &Transaction,
    hash: Hash,
    origin: &ResultOrigin,
    payload: Payload,
) -> Result<ReturnCode, ProcessError>
where
    A: AccountsAdapter + ?Sized,
{
    match payload {
        Payload::MoveBalance => Ok(account::move_balance(state, tx, hash, origin)),
        Payload::Deploy(deploy) => account::deploy(state, tx, hash, origin, deploy),
        Payload::Call(call) => account::call(state, tx, hash, origin, call),
        Payload::RemoteCall => Ok(account::remote_call(state, tx, hash, origin)),
        Payload::Relayed(inner) => Ok(relayed::relay(state, tx, hash, origin, inner)),
    }
}
