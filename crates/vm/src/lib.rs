pub mod account;
pub mod call_frame;
pub mod constants;
pub mod db;
pub mod environment;
pub mod errors;
pub mod gas_cost;
pub mod memory;
pub mod opcode_handlers;
pub mod opcodes;
pub mod operations;
pub mod testing;
pub mod utils;
pub mod vm;

pub use account::{Account, AccountInfo, Storage};
pub use call_frame::{Evm, Log, Message, Stack};
pub use db::{CacheDB, Database, GeneralizedDatabase, MemoryDb, StateBackup};
pub use environment::Environment;
pub use errors::{InternalError, OpcodeResult, VMError};
pub use vm::Vm;
