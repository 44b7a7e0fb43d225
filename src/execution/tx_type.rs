/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Classification of transactions.

use crate::{
    address::{is_empty_address, is_smart_contract_address},
    execution::relayed::is_relayed_data,
    types::Address,
};

/// Kind of processing a transaction gets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxType {
    /// Transfer of value, optionally with opaque data.
    MoveBalance,
    /// Deployment of a new contract. The receiver is the empty address.
    ScDeployment,
    /// Call of a contract function.
    ScInvoking,
    /// Transaction paid by a relayer on behalf of the sender of an inner transaction.
    RelayedTx,
}

/// Classifies a transaction by its receiver and data. The relayed marker takes precedence
/// over the receiver.
pub fn classify(receiver: &Address, data: &[u8]) -> TxType {
    if data.is_empty() {
        return TxType::MoveBalance;
    }
    if is_relayed_data(data) {
        return TxType::RelayedTx;
    }
    if is_empty_address(receiver) {
        return TxType::ScDeployment;
    }
    if is_smart_contract_address(receiver) {
        return TxType::ScInvoking;
    }
    TxType::MoveBalance
}
