/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Defines functions which are common to processing phases.
//!
//! Common Phases include:
//! - Pre-Charge: checks that the transaction can be processed and debits its sender upfront for
//! value and the whole gas limit.
//! - Charge: returns the gas that is known to be unused and accumulates the fee.
//!
//! The actual execution happens in between. It is implemented in modules [account](crate::execution::account),
//! [relayed](crate::execution::relayed) and [results](crate::execution::results).

use num_bigint::BigUint;
use num_traits::Zero;

use crate::{
    error::ProcessError,
    gas,
    ledger::AccountsAdapter,
    types::{Address, Hash, Transaction},
};

use super::state::{ExecutionState, ResultOrigin};

/// Pre-Charge is a Phase in processing. On success the sender is debited `value + gas_price * gas_limit`
/// and its nonce is incremented. On error nothing is changed.
///
/// `credit` is added to the sender balance together with the debit. It funds inner transactions
/// of relayed transactions.
pub(crate) fn pre_charge<A>(
    state: &mut ExecutionState<A>,
    tx: &Transaction,
    credit: &BigUint,
) -> Result<(), ProcessError>
where
    A: AccountsAdapter + ?Sized,
{
    let mut sender = state.accounts.load_or_create(&tx.sender);

    if tx.nonce != sender.nonce {
        log::debug!(
            "wrong nonce {} of {}, expected {}",
            tx.nonce,
            hex::encode(tx.sender),
            sender.nonce
        );
        return Err(ProcessError::WrongNonce {
            expected: sender.nonce,
            got: tx.nonce,
        });
    }

    let required = &tx.value + gas::fee_for_gas(tx.gas_price, tx.gas_limit);
    let available = &sender.balance + credit;
    if available < required {
        log::debug!("insufficient funds of {}", hex::encode(tx.sender));
        return Err(ProcessError::InsufficientFunds {
            required,
            available,
        });
    }

    sender.balance = available - required;
    sender.nonce += 1;
    state.accounts.save_account(sender);
    Ok(())
}

/// Charge is a Phase in processing. It returns `gas_unused` to the refund recipient of `origin`
/// and accumulates `fee` for `hash`. The refund is credited directly if the recipient lives in
/// this shard, otherwise it is sent as a refund result from `sender`.
pub(crate) fn charge<A>(
    state: &mut ExecutionState<A>,
    origin: &ResultOrigin,
    sender: &Address,
    gas_unused: u64,
    fee: BigUint,
    hash: Hash,
) where
    A: AccountsAdapter + ?Sized,
{
    let refund = gas::fee_for_gas(origin.gas_price, gas_unused);
    if !refund.is_zero() {
        let recipient = origin.refund_recipient();
        if state.is_local(&recipient) {
            state.credit(&recipient, &refund);
        } else {
            state.emit(origin.refund(*sender, refund));
        }
    }
    state.accumulate_fee(fee, BigUint::zero(), hash);
}
