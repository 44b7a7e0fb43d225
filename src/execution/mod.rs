/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Implementation of transaction and smart contract result processing.
//!
//! A transaction is [executed](execute) across [phases](phase): Validation -> Pre-Charge -> Execution -> Charge.
//! What the execution does depends on the [type](tx_type) of the transaction: an [account] operation
//! (move balance, deployment, call), possibly running a [contract], or a [relayed] transaction.
//! Executions produce smart contract results which continue them in other shards. Received
//! results are processed in [results].

pub(crate) mod account;

pub mod call_data;

pub(crate) mod contract;

pub(crate) mod execute;

pub(crate) mod phase;

pub mod relayed;

pub(crate) mod results;

pub(crate) mod state;

pub mod tx_type;
