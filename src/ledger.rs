/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Defines the account ledger interface and a cache layer on top of it.
//!
//! The ledger itself (storage trie, commit and root hash) is provided by the caller through
//! [AccountsAdapter]. Processing reads and writes accounts through [AccountsCache]:
//! - In Read Operation, `writes` is accessed first. If the account is not found, the ledger is accessed.
//! - In Write Operation, `writes` is updated with the newest account.
//!
//! If a contract execution succeeds, the data in `writes` is flushed to the ledger. Otherwise,
//! `writes` is discarded without any changes to the ledger.

use std::collections::{BTreeMap, HashMap};

use num_bigint::BigUint;

use crate::{
    error::StateError,
    types::{Address, Hash},
};

/// Account is the state of an address in the ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Account {
    pub address: Address,
    /// Incremented exactly once per processed transaction sent from this account.
    pub nonce: u64,
    pub balance: BigUint,
    /// Owner of a contract account. None for user accounts.
    pub owner: Option<Address>,
    pub code: Option<Vec<u8>>,
    pub code_hash: Option<Hash>,
    pub storage: BTreeMap<Vec<u8>, Vec<u8>>,
    /// Developer fees accrued by a contract account.
    pub developer_reward: BigUint,
}

impl Account {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            ..Default::default()
        }
    }

    pub fn is_contract(&self) -> bool {
        self.code.is_some()
    }
}

/// AccountsAdapter is the interface of the account ledger.
pub trait AccountsAdapter {
    /// Returns the account if it exists.
    fn get_account(&self, address: &Address) -> Option<Account>;

    /// Creates or overwrites the account.
    fn save_account(&mut self, account: Account);

    /// Persists the saved accounts and returns the new root hash.
    fn commit(&mut self) -> Result<Hash, StateError>;

    /// Returns the account, or a new empty one if it does not exist.
    fn load_or_create(&self, address: &Address) -> Account {
        self.get_account(address)
            .unwrap_or_else(|| Account::new(*address))
    }

    fn exists(&self, address: &Address) -> bool {
        self.get_account(address).is_some()
    }
}

/// AccountsCache defines a data cache for Read-Write operations during a contract execution.
pub(crate) struct AccountsCache<'a, A: AccountsAdapter + ?Sized> {
    /// Ledger serves as the data source
    ledger: &'a mut A,
    /// writes stores the accounts pending to be saved into the ledger
    writes: HashMap<Address, Account>,
}

impl<'a, A: AccountsAdapter + ?Sized> AccountsCache<'a, A> {
    pub fn new(ledger: &'a mut A) -> Self {
        Self {
            ledger,
            writes: HashMap::new(),
        }
    }

    /// Discards all pending writes.
    pub fn revert_changes(&mut self) {
        self.writes.clear();
    }

    /// Saves all pending writes into the ledger.
    pub fn flush(self) {
        for (_, account) in self.writes {
            self.ledger.save_account(account);
        }
    }
}

impl<'a, A: AccountsAdapter + ?Sized> AccountsAdapter for AccountsCache<'a, A> {
    fn get_account(&self, address: &Address) -> Option<Account> {
        match self.writes.get(address) {
            Some(account) => Some(account.clone()),
            None => self.ledger.get_account(address),
        }
    }

    fn save_account(&mut self, account: Account) {
        self.writes.insert(account.address, account);
    }

    /// Commit is owned by the processor. The cache only flushes.
    fn commit(&mut self) -> Result<Hash, StateError> {
        Err(StateError::Commit(
            "accounts cache cannot be committed".to_string(),
        ))
    }
}
