/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Interface of the virtual machine which executes contract code.
//!
//! The virtual machine only computes. It reads accounts through the ledger view it is given,
//! and reports every effect of the execution in [VmOutput]. Applying the effects (storage,
//! transfers, outgoing calls) and charging for them is done by the processor.

use num_bigint::BigUint;

use crate::{
    ledger::AccountsAdapter,
    types::{Address, Hash, ReturnCode},
};

/// VirtualMachine executes contract constructors, contract calls and read-only queries.
///
/// An `Err` is an infrastructure failure of the machine itself and aborts processing.
/// A failure of the contract is reported through [VmOutput::return_code].
pub trait VirtualMachine: Send + Sync {
    fn execute(&self, input: &VmInput, accounts: &dyn AccountsAdapter) -> anyhow::Result<VmOutput>;
}

/// Kind of execution requested from the virtual machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallKind {
    /// Run the constructor of new contract code. `vm_type` is the 2 byte identifier of the
    /// machine the code is written for.
    Deploy { code: Vec<u8>, vm_type: [u8; 2] },
    /// Call a function of an existing contract.
    Call { function: String },
}

/// Input to a virtual machine execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VmInput {
    pub caller: Address,
    /// The contract account. For a deployment, the address the new contract will take.
    pub recipient: Address,
    pub call_value: BigUint,
    pub arguments: Vec<Vec<u8>>,
    pub gas_provided: u64,
    pub gas_price: u64,
    pub original_tx_hash: Hash,
    pub kind: CallKind,
}

impl VmInput {
    pub fn function(&self) -> Option<&str> {
        match &self.kind {
            CallKind::Call { function } => Some(function),
            CallKind::Deploy { .. } => None,
        }
    }
}

/// A write to the storage of the executing contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageUpdate {
    pub key: Vec<u8>,
    /// Empty value deletes the key.
    pub value: Vec<u8>,
}

/// A plain value transfer from the executing contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueTransfer {
    pub receiver: Address,
    pub value: BigUint,
    /// Optional data attached to the transfer, delivered as the data of the result.
    pub data: Vec<u8>,
}

/// A call from the executing contract to another contract. The gas given to it is forwarded
/// with the call and is not consumed by the executing contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingCall {
    pub receiver: Address,
    pub value: BigUint,
    /// `function@hexarg@...`
    pub data: Vec<u8>,
    pub gas_limit: u64,
}

/// Output of a virtual machine execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VmOutput {
    pub return_code: ReturnCode,
    pub return_message: String,
    pub return_data: Vec<Vec<u8>>,
    /// Gas left out of [VmInput::gas_provided], not counting gas forwarded with outgoing calls.
    pub gas_remaining: u64,
    pub storage_updates: Vec<StorageUpdate>,
    pub value_transfers: Vec<ValueTransfer>,
    pub outgoing_calls: Vec<OutgoingCall>,
}

impl VmOutput {
    /// Output of a failed execution. Failed executions consume all gas.
    pub fn failure(return_code: ReturnCode, return_message: impl Into<String>) -> Self {
        Self {
            return_code,
            return_message: return_message.into(),
            return_data: Vec::new(),
            gas_remaining: 0,
            storage_updates: Vec::new(),
            value_transfers: Vec::new(),
            outgoing_calls: Vec::new(),
        }
    }

    /// Output of a successful execution without side effects.
    pub fn success(gas_remaining: u64) -> Self {
        Self {
            return_code: ReturnCode::Ok,
            gas_remaining,
            ..Self::failure(ReturnCode::Ok, "")
        }
    }

    /// Gas forwarded with outgoing calls.
    pub fn gas_forwarded(&self) -> u64 {
        self.outgoing_calls
            .iter()
            .fold(0u64, |acc, call| acc.saturating_add(call.gas_limit))
    }
}
