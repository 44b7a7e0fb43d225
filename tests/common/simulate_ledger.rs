use std::collections::BTreeMap;

use num_bigint::BigUint;
use shard_runtime::{
    error::StateError, serialization::blake2b_256, Account, AccountsAdapter, Address, Hash,
};

/// Account ledger kept in memory. Saved accounts are visible right away; commit only computes
/// a root hash over them.
#[derive(Clone, Default)]
pub struct SimulateLedger {
    accounts: BTreeMap<Address, Account>,
    commits: u64,
}

impl AccountsAdapter for SimulateLedger {
    fn get_account(&self, address: &Address) -> Option<Account> {
        self.accounts.get(address).cloned()
    }

    fn save_account(&mut self, account: Account) {
        self.accounts.insert(account.address, account);
    }

    fn commit(&mut self) -> Result<Hash, StateError> {
        self.commits += 1;
        let mut bytes = Vec::new();
        for (address, account) in &self.accounts {
            bytes.extend_from_slice(address);
            bytes.extend(account.nonce.to_le_bytes());
            bytes.extend(account.balance.to_bytes_be());
        }
        Ok(blake2b_256(&bytes))
    }
}

impl SimulateLedger {
    pub fn get_balance(&self, address: &Address) -> u64 {
        self.accounts
            .get(address)
            .map(|account| u64::try_from(&account.balance).unwrap())
            .unwrap_or(0)
    }

    pub fn set_balance(&mut self, address: &Address, balance: u64) {
        let mut account = self.load_or_create(address);
        account.balance = BigUint::from(balance);
        self.save_account(account);
    }

    pub fn get_nonce(&self, address: &Address) -> u64 {
        self.accounts.get(address).map(|a| a.nonce).unwrap_or(0)
    }

    pub fn get_storage_data(&self, address: &Address, key: &[u8]) -> Option<Vec<u8>> {
        self.accounts
            .get(address)
            .and_then(|account| account.storage.get(key).cloned())
    }

    pub fn get_developer_reward(&self, address: &Address) -> u64 {
        self.accounts
            .get(address)
            .map(|account| u64::try_from(&account.developer_reward).unwrap())
            .unwrap_or(0)
    }

    /// Sum of all balances.
    pub fn total_balance(&self) -> BigUint {
        self.accounts.values().map(|a| &a.balance).sum()
    }

    pub fn commits(&self) -> u64 {
        self.commits
    }
}
