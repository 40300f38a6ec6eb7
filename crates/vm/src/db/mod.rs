pub mod cache;

use crate::account::Account;
use ethereum_types::Address;
use std::{collections::HashMap, fmt::Debug, sync::Arc};

/// Overlay of pending state mutations, keyed by address. Everything a frame
/// tree writes lands here; the backing store is never touched by the core.
pub type CacheDB = HashMap<Address, Account>;

/// Read-only account source backing the overlay.
pub trait Database: Debug {
    /// Absent accounts read as `Account::default()`.
    fn get_account(&self, address: Address) -> Account;

    /// Whether the address has an account at all. Distinct from emptiness:
    /// the new-account surcharge of CALL keys off existence.
    fn account_exists(&self, address: Address) -> bool;
}

/// Plain in-memory account map. The bundled `Database` for tests and
/// standalone runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryDb {
    pub accounts: HashMap<Address, Account>,
}

impl MemoryDb {
    pub fn with_accounts(accounts: HashMap<Address, Account>) -> Self {
        Self { accounts }
    }
}

impl Database for MemoryDb {
    fn get_account(&self, address: Address) -> Account {
        self.accounts.get(&address).cloned().unwrap_or_default()
    }

    fn account_exists(&self, address: Address) -> bool {
        self.accounts.contains_key(&address)
    }
}

/// Snapshot of the overlay, taken when a frame starts and either dropped
/// (commit) or restored (rollback) when it ends.
#[derive(Debug)]
pub struct StateBackup {
    cache: CacheDB,
}

/// A read-only store plus the transactional overlay on top of it.
#[derive(Debug, Clone)]
pub struct GeneralizedDatabase {
    pub store: Arc<dyn Database>,
    pub cache: CacheDB,
}

impl GeneralizedDatabase {
    pub fn new(store: Arc<dyn Database>, cache: CacheDB) -> Self {
        Self { store, cache }
    }

    pub fn begin_transaction(&self) -> StateBackup {
        StateBackup {
            cache: self.cache.clone(),
        }
    }

    pub fn commit(&mut self, backup: StateBackup) {
        drop(backup);
    }

    pub fn rollback(&mut self, backup: StateBackup) {
        self.cache = backup.cache;
    }
}
