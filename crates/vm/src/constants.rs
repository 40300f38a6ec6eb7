use ethereum_types::U256;

/// Maximum number of words the operand stack may hold.
pub const STACK_LIMIT: usize = 1024;

/// Maximum nesting depth of message frames.
pub const STACK_DEPTH_LIMIT: usize = 1024;

/// Memory and stack words are 32 bytes wide.
pub const WORD_SIZE: usize = 32;
pub const WORD_SIZE_IN_BYTES: U256 = U256([32, 0, 0, 0]);

pub const SUCCESS_FOR_CALL: U256 = U256([1, 0, 0, 0]);
pub const REVERT_FOR_CALL: U256 = U256([0, 0, 0, 0]);
pub const CREATE_DEPLOYMENT_FAIL: U256 = U256([0, 0, 0, 0]);
