//! Builders for exercising the interpreter against an in-memory world state.
use crate::{
    account::Account,
    call_frame::Message,
    db::{CacheDB, GeneralizedDatabase, MemoryDb},
    operations::{ops_to_bytecode, Operation},
};
use bytes::Bytes;
use ethereum_types::{Address, U256};
use std::{collections::HashMap, sync::Arc};

pub fn default_caller() -> Address {
    Address::from_low_u64_be(0x100)
}

pub fn default_target() -> Address {
    Address::from_low_u64_be(0x42)
}

pub fn new_db() -> GeneralizedDatabase {
    GeneralizedDatabase::new(Arc::new(MemoryDb::default()), CacheDB::new())
}

pub fn new_db_with_accounts(accounts: HashMap<Address, Account>) -> GeneralizedDatabase {
    GeneralizedDatabase::new(Arc::new(MemoryDb::with_accounts(accounts)), CacheDB::new())
}

/// A top-level call message running `code` at [`default_target`].
pub fn message_with_code(code: Bytes, gas: U256) -> Message {
    Message {
        caller: default_caller(),
        target: Some(default_target()),
        current_target: default_target(),
        code_address: Some(default_target()),
        gas,
        value: U256::zero(),
        data: Bytes::new(),
        code,
        depth: 0,
    }
}

pub fn message_with_ops(operations: &[Operation], gas: U256) -> Message {
    message_with_code(ops_to_bytecode(operations), gas)
}
