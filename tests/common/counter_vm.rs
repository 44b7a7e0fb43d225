use num_bigint::BigUint;
use shard_runtime::{
    vm::{CallKind, OutgoingCall, StorageUpdate, ValueTransfer, VirtualMachine, VmInput, VmOutput},
    AccountsAdapter, Address, ReturnCode,
};

pub const COUNTER_KEY: &[u8] = b"counter";

pub const DEPLOY_GAS: u64 = 368;
pub const INCREMENT_GAS: u64 = 376;
pub const GET_GAS: u64 = 100;
pub const SEND_GAS: u64 = 200;
pub const FORWARD_GAS: u64 = 300;

/// CounterVm runs a counter contract whatever the deployed code is.
///
/// - constructor: sets the counter to 1
/// - `increment`: adds 1 to the counter
/// - `get`: returns the counter
/// - `send@receiver@value`: transfers value from the contract
/// - `forward@receiver@function@gas`: calls `function` of another contract with `gas`
/// - `fail`: fails with a user error
/// - `overspend`: increments the counter but returns more gas than provided
pub struct CounterVm;

impl VirtualMachine for CounterVm {
    fn execute(&self, input: &VmInput, accounts: &dyn AccountsAdapter) -> anyhow::Result<VmOutput> {
        let contract = match accounts.get_account(&input.recipient) {
            Some(account) if account.code.is_some() => account,
            _ => return Ok(VmOutput::failure(ReturnCode::ContractNotFound, "")),
        };
        let counter = contract
            .storage
            .get(COUNTER_KEY)
            .map(|bytes| BigUint::from_bytes_be(bytes))
            .unwrap_or_default();

        let function = match &input.kind {
            CallKind::Deploy { .. } => {
                return Ok(with_gas(input, DEPLOY_GAS, |output| {
                    output.storage_updates.push(counter_update(BigUint::from(1u64)));
                }))
            }
            CallKind::Call { function } => function.as_str(),
        };

        let output = match function {
            "increment" => with_gas(input, INCREMENT_GAS, |output| {
                output.storage_updates.push(counter_update(counter + 1u64));
            }),
            "get" => with_gas(input, GET_GAS, |output| {
                output.return_data.push(counter.to_bytes_be());
            }),
            "send" => with_gas(input, SEND_GAS, |output| {
                output.value_transfers.push(ValueTransfer {
                    receiver: address_arg(&input.arguments[0]),
                    value: BigUint::from_bytes_be(&input.arguments[1]),
                    data: Vec::new(),
                });
            }),
            "forward" => {
                let gas_limit = u64::from_be_bytes(input.arguments[2].as_slice().try_into()?);
                // gas given to the outgoing call is not part of gas_remaining
                with_gas(input, FORWARD_GAS + gas_limit, |output| {
                    output.outgoing_calls.push(OutgoingCall {
                        receiver: address_arg(&input.arguments[0]),
                        value: BigUint::default(),
                        data: input.arguments[1].clone(),
                        gas_limit,
                    });
                })
            }
            "fail" => VmOutput::failure(ReturnCode::UserError, "counter refuses"),
            // reports more gas than it was given
            "overspend" => {
                let mut output = VmOutput::success(input.gas_provided + 1);
                output.storage_updates.push(counter_update(counter + 1u64));
                output
            }
            _ => VmOutput::failure(
                ReturnCode::FunctionNotFound,
                format!("invalid function {function}"),
            ),
        };
        Ok(output)
    }
}

/// Output which uses `cost` gas, or fails with OutOfGas.
fn with_gas(input: &VmInput, cost: u64, effects: impl FnOnce(&mut VmOutput)) -> VmOutput {
    match input.gas_provided.checked_sub(cost) {
        Some(gas_remaining) => {
            let mut output = VmOutput::success(gas_remaining);
            effects(&mut output);
            output
        }
        None => VmOutput::failure(ReturnCode::OutOfGas, "not enough gas"),
    }
}

fn counter_update(value: BigUint) -> StorageUpdate {
    StorageUpdate {
        key: COUNTER_KEY.to_vec(),
        value: value.to_bytes_be(),
    }
}

fn address_arg(bytes: &[u8]) -> Address {
    let mut address = [0u8; 32];
    address.copy_from_slice(bytes);
    address
}
