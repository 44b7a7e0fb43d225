/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Execution of contract constructors and contract calls through the virtual machine.
//!
//! The contract runs on top of an [AccountsCache]. Its effects (created account, storage, value
//! transfers, developer reward) reach the ledger only if the execution succeeds. A failed
//! execution consumes all gas it was given and returns the call value to the caller through an
//! error result.

use num_bigint::BigUint;

use crate::{
    address::code_hash,
    error::ProcessError,
    execution::call_data::error_payload,
    gas,
    ledger::{Account, AccountsAdapter, AccountsCache},
    types::{Address, Hash, ReturnCode, SmartContractResult},
    vm::{CallKind, VmInput, VmOutput},
};

use super::state::{ExecutionState, ResultOrigin};

/// Outcome of running a contract.
#[derive(Debug)]
pub(crate) enum ContractOutcome {
    Success {
        gas_used: u64,
        gas_remaining: u64,
        developer_fee: BigUint,
        /// Value transfers and outgoing calls of the contract
        results: Vec<SmartContractResult>,
    },
    Failure {
        return_code: ReturnCode,
        message: String,
    },
}

impl ContractOutcome {
    fn failure(return_code: ReturnCode, message: impl Into<String>) -> Self {
        Self::Failure {
            return_code,
            message: message.into(),
        }
    }
}

/// Runs the contract and settles the outcome. `base_fee` is the fee already due for including
/// the operation (zero for results, the move balance fee for transactions). It is added to the
/// fee for the gas consumed by the contract.
pub(crate) fn execute<A>(
    state: &mut ExecutionState<A>,
    input: VmInput,
    origin: &ResultOrigin,
    base_fee: BigUint,
    hash: Hash,
) -> Result<ReturnCode, ProcessError>
where
    A: AccountsAdapter + ?Sized,
{
    let contract = input.recipient;
    let caller = input.caller;
    let call_value = input.call_value.clone();
    let gas_provided = input.gas_provided;

    match run(state, input, origin)? {
        ContractOutcome::Success {
            gas_used,
            gas_remaining,
            developer_fee,
            results,
        } => {
            log::debug!(
                "contract {} used {} gas, {} remaining",
                hex::encode(contract),
                gas_used,
                gas_remaining
            );
            for scr in results {
                state.emit(scr);
            }
            if gas_remaining > 0 {
                let refund = gas::fee_for_gas(origin.gas_price, gas_remaining);
                state.emit(origin.refund(contract, refund));
            }
            let fee = base_fee + gas::fee_for_gas(origin.gas_price, gas_used);
            state.accumulate_fee(fee, developer_fee, hash);
            Ok(ReturnCode::Ok)
        }
        ContractOutcome::Failure {
            return_code,
            message,
        } => {
            let fee = base_fee + gas::fee_for_gas(origin.gas_price, gas_provided);
            Ok(fail_execution(
                state,
                origin,
                FailedExecution {
                    from: contract,
                    to: caller,
                    value: call_value,
                    fee,
                    hash,
                    return_code,
                    message: &message,
                },
            ))
        }
    }
}

/// Settlement of an execution that failed.
pub(crate) struct FailedExecution<'m> {
    /// Sender of the error result
    pub from: Address,
    /// Receiver of the error result, the caller
    pub to: Address,
    /// Value returned to the caller
    pub value: BigUint,
    /// Fee for all the gas given to the execution
    pub fee: BigUint,
    pub hash: Hash,
    pub return_code: ReturnCode,
    pub message: &'m str,
}

/// Accumulates the fee of a failed execution and returns the value to the caller through an error
/// result. Returns the code to report.
pub(crate) fn fail_execution<A>(
    state: &mut ExecutionState<A>,
    origin: &ResultOrigin,
    failed: FailedExecution,
) -> ReturnCode
where
    A: AccountsAdapter + ?Sized,
{
    log::debug!(
        "execution of {} failed with {}: {}",
        hex::encode(failed.hash),
        failed.return_code,
        failed.message
    );
    let data = error_payload(failed.return_code, failed.message);
    state.emit(origin.result(failed.from, failed.to, failed.value, data, 0));
    state.accumulate_fee(failed.fee, BigUint::default(), failed.hash);
    failed.return_code.as_process_code()
}

/// Runs the virtual machine on top of a cache of the ledger. The cache is flushed only if the
/// execution succeeds and its effects can be applied.
fn run<A>(
    state: &mut ExecutionState<A>,
    input: VmInput,
    origin: &ResultOrigin,
) -> Result<ContractOutcome, ProcessError>
where
    A: AccountsAdapter + ?Sized,
{
    let vm = state.vm;
    let economics = state.economics;
    let mut cache = AccountsCache::new(&mut *state.accounts);

    // Phase: load or create the contract, which receives the call value
    let mut contract = match &input.kind {
        CallKind::Deploy { code, .. } => {
            if cache.exists(&input.recipient) {
                return Ok(ContractOutcome::failure(
                    ReturnCode::ContractInvalid,
                    "contract address already in use",
                ));
            }
            Account {
                owner: Some(input.caller),
                code: Some(code.clone()),
                code_hash: Some(code_hash(code)),
                ..Account::new(input.recipient)
            }
        }
        CallKind::Call { .. } => match cache.get_account(&input.recipient) {
            Some(account) if account.is_contract() => account,
            _ => return Ok(ContractOutcome::failure(ReturnCode::ContractNotFound, "")),
        },
    };
    contract.balance += &input.call_value;
    cache.save_account(contract);

    // Phase: execute
    let output = vm.execute(&input, &cache)?;
    if !output.return_code.is_ok() {
        cache.revert_changes();
        return Ok(ContractOutcome::failure(
            output.return_code,
            output.return_message,
        ));
    }

    let gas_forwarded = output.gas_forwarded();
    let gas_used = match input
        .gas_provided
        .checked_sub(output.gas_remaining)
        .and_then(|gas| gas.checked_sub(gas_forwarded))
    {
        Some(gas_used) => gas_used,
        None => {
            cache.revert_changes();
            return Ok(ContractOutcome::failure(
                ReturnCode::ExecutionFailed,
                "gas remaining exceeds gas provided",
            ));
        }
    };

    // Phase: apply effects
    let mut contract = cache.load_or_create(&input.recipient);
    if let Err(outcome) = apply_output(&mut contract, &output) {
        cache.revert_changes();
        return Ok(outcome);
    }
    let developer_fee = economics.developer_fee(&gas::fee_for_gas(input.gas_price, gas_used));
    contract.developer_reward += &developer_fee;
    cache.save_account(contract);
    cache.flush();

    let results = output
        .value_transfers
        .into_iter()
        .map(|transfer| {
            origin.result(
                input.recipient,
                transfer.receiver,
                transfer.value,
                transfer.data,
                0,
            )
        })
        .chain(output.outgoing_calls.into_iter().map(|call| {
            origin.result(
                input.recipient,
                call.receiver,
                call.value,
                call.data,
                call.gas_limit,
            )
        }))
        .collect();

    Ok(ContractOutcome::Success {
        gas_used,
        gas_remaining: output.gas_remaining,
        developer_fee,
        results,
    })
}

/// Applies storage updates and debits the value leaving the contract.
fn apply_output(contract: &mut Account, output: &VmOutput) -> Result<(), ContractOutcome> {
    for update in &output.storage_updates {
        if update.value.is_empty() {
            contract.storage.remove(&update.key);
        } else {
            contract
                .storage
                .insert(update.key.clone(), update.value.clone());
        }
    }

    let outgoing = output
        .value_transfers
        .iter()
        .map(|transfer| &transfer.value)
        .chain(output.outgoing_calls.iter().map(|call| &call.value))
        .fold(BigUint::default(), |acc, value| acc + value);
    if contract.balance < outgoing {
        return Err(ContractOutcome::failure(
            ReturnCode::OutOfFunds,
            "contract balance is lower than the value sent",
        ));
    }
    contract.balance -= outgoing;
    Ok(())
}
