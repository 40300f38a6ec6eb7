use bytes::Bytes;
use ethereum_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Contract storage: 256-bit keys to 256-bit values.
pub type Storage = HashMap<U256, U256>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub balance: U256,
    pub nonce: u64,
}

/// World-state account. An address with no account behaves exactly like
/// `Account::default()`: reads of absent accounts yield the empty account,
/// writes materialize it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub info: AccountInfo,
    pub code: Bytes,
    pub storage: Storage,
}

impl Account {
    pub fn new(balance: U256, code: Bytes, nonce: u64, storage: Storage) -> Self {
        Self {
            info: AccountInfo { balance, nonce },
            code,
            storage,
        }
    }

    /// The collision predicate used by contract creation.
    pub fn has_code_or_nonce(&self) -> bool {
        !self.code.is_empty() || self.info.nonce != 0
    }

    pub fn is_empty(&self) -> bool {
        self.info.balance.is_zero() && self.info.nonce == 0 && self.code.is_empty()
    }
}
