/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Shard Runtime is the transaction execution and fee settlement core of a sharded ledger.
//!
//! Each shard runs its own [TxProcessor] over the accounts it owns. A transaction is processed in
//! the shard of its sender. Whatever continues in other shards (value for a remote receiver, a
//! call of a remote contract, a refund of unused gas, an error) is carried by a
//! [SmartContractResult], collected in the outbox of the [BlockContext] and later processed by
//! the destination shard.
//!
//! ```text
//! shard(sender):   process_transaction(block, tx)            -> ReturnCode, outbox += SCRs
//! shard(receiver): process_smart_contract_result(block, scr) -> ReturnCode, outbox += SCRs
//! ```
//!
//! ### Example
//!
//! ```rust
//! let mut processor = TxProcessor::builder()
//!     .set_accounts(ledger)
//!     .set_virtual_machine(vm)
//!     .set_shard_coordinator(Arc::new(MultiShardCoordinator::new(3, 0)?))
//!     .set_economics(Arc::new(Economics::new(EconomicsConfig::default())?))
//!     .build()?;
//!
//! let mut block = BlockContext::new();
//! let return_code = processor.process_transaction(&mut block, &tx)?;
//! let for_shard_1 = block.outbox_mut().take_results_for_shard(1);
//! ```
//!
//! Fees are computed by the [fees] module and accumulated per block. [Relayed](execution::relayed)
//! transactions let a relayer pay the gas of another account's transaction. Contract code is run
//! by the [VirtualMachine](vm::VirtualMachine) collaborator, and accounts are stored by the
//! [AccountsAdapter](ledger::AccountsAdapter) collaborator.

pub mod address;

pub mod block;
pub use block::BlockContext;

pub mod error;
pub use error::{CallDataError, ConfigError, DecodeError, ProcessError, RelayedTxError, StateError};

pub mod execution;
pub use execution::tx_type::TxType;

pub mod fees;

pub mod forwarder;
pub use forwarder::IntermediateResults;

pub mod gas;

pub mod ledger;
pub use ledger::{Account, AccountsAdapter};

pub mod processor;
pub use processor::{TxProcessor, TxProcessorBuilder};

pub mod query;
pub use query::{ScQuery, ScQueryService};

pub mod serialization;
pub use serialization::Serializable;

pub mod sharding;
pub use sharding::{MultiShardCoordinator, ShardCoordinator};

pub mod types;
pub use types::{Address, Hash, ReturnCode, ShardId, SmartContractResult, Transaction};

pub mod vm;
