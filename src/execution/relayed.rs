/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Relayed transactions: a relayer pays the gas of an inner transaction signed by another account.
//!
//! The data of a relayed transaction is the envelope `relayedTx@<hex of the inner transaction>`.
//! Processing spans up to three shards:
//! 1. Relayer shard: the relayer is charged like any sender. The fee of the relayed transaction
//! itself is collected, gas beyond the inner gas limit is returned, and the inner value plus the
//! inner gas funding is sent to the inner sender in a result that carries the envelope.
//! 2. Inner sender shard: the funding is credited to the inner sender, which then executes the
//! inner transaction as its own. Unused gas goes back to the relayer.
//! 3. Receiver shard: the inner transaction continues as any cross-shard result.
//!
//! An envelope which cannot be decoded fails validation: the relayed transaction is rejected and
//! nothing is charged. Once the relayed transaction is charged, a failure at any hop consumes the
//! gas paid by the relayer and is reported through results with an error payload.

use num_bigint::BigUint;

use crate::{
    error::{ProcessError, RelayedTxError},
    execution::call_data::ARGUMENT_SEPARATOR,
    gas,
    ledger::AccountsAdapter,
    serialization::Serializable,
    types::{Hash, ReturnCode, SmartContractResult, Transaction},
};

use super::{
    contract::{self, FailedExecution},
    execute::{self, decode_payload},
    phase,
    state::{ExecutionState, ResultOrigin},
    tx_type::{classify, TxType},
};

/// Function name which marks relayed transaction data.
pub const RELAYED_TX_MARKER: &[u8] = b"relayedTx";

pub fn is_relayed_data(data: &[u8]) -> bool {
    data.len() > RELAYED_TX_MARKER.len()
        && data.starts_with(RELAYED_TX_MARKER)
        && data[RELAYED_TX_MARKER.len()] == ARGUMENT_SEPARATOR
}

/// Builds the data of a transaction relaying `inner`.
pub fn prepare(inner: &Transaction) -> Vec<u8> {
    let mut data = RELAYED_TX_MARKER.to_vec();
    data.push(ARGUMENT_SEPARATOR);
    data.extend(hex::encode(inner.serialize()).into_bytes());
    data
}

/// Decodes the inner transaction from relayed transaction data.
pub fn unwrap(data: &[u8]) -> Result<Transaction, RelayedTxError> {
    if !is_relayed_data(data) {
        return Err(RelayedTxError::MissingMarker);
    }
    let encoded = hex::decode(&data[RELAYED_TX_MARKER.len() + 1..])?;
    Ok(Transaction::deserialize(&encoded)?)
}

/// Checks the inner transaction against the relayed transaction. `gas_available` is the gas
/// of the relayed transaction left after its own move balance cost.
fn check_consistency(
    relayed: &Transaction,
    inner: &Transaction,
    gas_available: u64,
) -> Result<(), RelayedTxError> {
    if inner.sender != relayed.receiver {
        return Err(RelayedTxError::BeneficiaryMismatch);
    }
    if inner.value != relayed.value {
        return Err(RelayedTxError::ValueMismatch);
    }
    if inner.gas_price != relayed.gas_price {
        return Err(RelayedTxError::GasPriceMismatch);
    }
    if gas_available < inner.gas_limit {
        return Err(RelayedTxError::GasLimitMismatch {
            available: gas_available,
            required: inner.gas_limit,
        });
    }
    if is_relayed_data(&inner.data) {
        return Err(RelayedTxError::RecursiveRelay);
    }
    Ok(())
}

/// Execution of a relayed transaction in the relayer shard, after Pre-Charge. `inner` is the
/// transaction decoded from the envelope.
pub(crate) fn relay<A>(
    state: &mut ExecutionState<A>,
    tx: &Transaction,
    hash: Hash,
    origin: &ResultOrigin,
    inner: Transaction,
) -> ReturnCode
where
    A: AccountsAdapter + ?Sized,
{
    let move_balance_gas = state.economics.compute_gas_limit(tx);
    let gas_available = tx.gas_limit.saturating_sub(move_balance_gas);

    if let Err(err) = check_consistency(tx, &inner, gas_available) {
        log::debug!("relayed transaction {} rejected: {}", hex::encode(hash), err);
        return contract::fail_execution(
            state,
            origin,
            FailedExecution {
                from: tx.receiver,
                to: tx.sender,
                value: tx.value.clone(),
                fee: gas::fee_for_gas(tx.gas_price, tx.gas_limit),
                hash,
                return_code: ReturnCode::UserError,
                message: &err.to_string(),
            },
        );
    }

    let funding = &inner.value + gas::fee_for_gas(inner.gas_price, inner.gas_limit);
    let relayer_origin = ResultOrigin {
        relayer: Some(tx.sender),
        ..origin.clone()
    };
    log::debug!(
        "relay inner transaction of {} with funding {}",
        hex::encode(inner.sender),
        funding
    );
    state.emit(relayer_origin.result(
        tx.sender,
        inner.sender,
        funding,
        tx.data.clone(),
        inner.gas_limit,
    ));

    let fee = state.economics.compute_fee(tx);
    phase::charge(
        state,
        origin,
        &tx.sender,
        gas_available - inner.gas_limit,
        fee,
        hash,
    );
    ReturnCode::Ok
}

/// Processing of the funding result in the shard of the inner sender: the inner transaction is
/// executed on behalf of its sender with the gas paid by the relayer.
///
/// If the inner transaction cannot be executed (malformed envelope or data, wrong nonce, invalid
/// gas values), the funded gas is collected as fee, the inner value is returned to the relayer
/// and the inner sender is left untouched.
pub(crate) fn process_relayed_result<A>(
    state: &mut ExecutionState<A>,
    scr: &SmartContractResult,
    hash: Hash,
) -> Result<ReturnCode, ProcessError>
where
    A: AccountsAdapter + ?Sized,
{
    let (inner, payload) = match unwrap(&scr.data)
        .map_err(ProcessError::from)
        .and_then(|inner| {
            check_funding(scr, &inner)
                .map(|_| inner)
                .map_err(ProcessError::from)
        })
        .and_then(|inner| {
            state.economics.check_validity_tx_values(&inner)?;
            let payload = decode_payload(state, &inner)?;
            phase::pre_charge(state, &inner, &scr.value)?;
            Ok((inner, payload))
        }) {
        Ok(decoded) => decoded,
        Err(err) => return Ok(reject_funding(state, scr, hash, &err.to_string())),
    };

    let inner_hash = inner.hash();
    let origin = ResultOrigin::from_inner_transaction(&inner, inner_hash, scr);
    log::debug!(
        "execute inner transaction {} ({:?})",
        hex::encode(inner_hash),
        classify(&inner.receiver, &inner.data)
    );
    execute::dispatch(state, &inner, inner_hash, &origin, payload)
}

/// The funding result must carry exactly the value and gas of the inner transaction.
fn check_funding(scr: &SmartContractResult, inner: &Transaction) -> Result<(), RelayedTxError> {
    if inner.sender != scr.receiver {
        return Err(RelayedTxError::BeneficiaryMismatch);
    }
    if inner.gas_price != scr.gas_price {
        return Err(RelayedTxError::GasPriceMismatch);
    }
    if inner.gas_limit != scr.gas_limit {
        return Err(RelayedTxError::GasLimitMismatch {
            available: scr.gas_limit,
            required: inner.gas_limit,
        });
    }
    if &inner.value + gas::fee_for_gas(inner.gas_price, inner.gas_limit) != scr.value {
        return Err(RelayedTxError::ValueMismatch);
    }
    if classify(&inner.receiver, &inner.data) == TxType::RelayedTx {
        return Err(RelayedTxError::RecursiveRelay);
    }
    Ok(())
}

fn reject_funding<A>(
    state: &mut ExecutionState<A>,
    scr: &SmartContractResult,
    hash: Hash,
    message: &str,
) -> ReturnCode
where
    A: AccountsAdapter + ?Sized,
{
    let relayer = scr.refund_recipient();
    let gas_paid = gas::fee_for_gas(scr.gas_price, scr.gas_limit).min(scr.value.clone());
    let returned: BigUint = &scr.value - &gas_paid;
    let origin = ResultOrigin::from_result(scr, hash);
    contract::fail_execution(
        state,
        &origin,
        FailedExecution {
            from: scr.receiver,
            to: relayer,
            value: returned,
            fee: gas_paid,
            hash,
            return_code: ReturnCode::UserError,
            message,
        },
    )
}
