use crate::{
    constants::STACK_LIMIT,
    errors::{InternalError, VMError},
    gas_cost,
    memory::{self, Memory},
};
use bytes::Bytes;
use ethereum_types::{Address, H256, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stack {
    pub stack: Vec<U256>,
}

impl Stack {
    pub fn pop(&mut self) -> Result<U256, VMError> {
        self.stack.pop().ok_or(VMError::StackUnderflow)
    }

    pub fn push(&mut self, value: U256) -> Result<(), VMError> {
        if self.stack.len() >= STACK_LIMIT {
            return Err(VMError::StackOverflow);
        }
        self.stack.push(value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&U256, VMError> {
        self.stack.get(index).ok_or(VMError::StackUnderflow)
    }

    pub fn swap(&mut self, a: usize, b: usize) -> Result<(), VMError> {
        if a >= self.stack.len() || b >= self.stack.len() {
            return Err(VMError::StackUnderflow);
        }
        self.stack.swap(a, b);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    pub address: Address,
    pub topics: Vec<H256>,
    pub data: Bytes,
}

/// What one frame was asked to do. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// Account that spawned this frame.
    pub caller: Address,
    /// Call recipient; `None` for contract creation.
    pub target: Option<Address>,
    /// Account whose code runs and whose storage is live. For CALLCODE this
    /// is the caller's own `current_target`, not the code's home.
    pub current_target: Address,
    /// Where `code` was loaded from; `None` for contract creation.
    pub code_address: Option<Address>,
    /// Gas budgeted to this frame.
    pub gas: U256,
    /// Wei endowment or transfer.
    pub value: U256,
    /// Input bytes.
    pub data: Bytes,
    /// Bytecode to execute.
    pub code: Bytes,
    /// 0 for the top-level frame.
    pub depth: usize,
}

/// One execution frame: the machine state the interpreter mutates while
/// running a [`Message`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evm {
    pub pc: usize,
    pub stack: Stack,
    pub memory: Memory,
    pub gas_left: U256,
    /// Bytes produced by RETURN; empty on any other halt.
    pub output: Bytes,
    pub running: bool,
    /// Set on exceptional halt. Gas is zeroed and the frame's state writes
    /// are discarded alongside.
    pub has_erred: bool,
    pub logs: Vec<Log>,
    /// Addresses queued for post-transaction deletion by SELFDESTRUCT.
    pub accounts_to_delete: HashSet<Address>,
    /// Finished child frames, in spawn order.
    pub children: Vec<Evm>,
    pub message: Message,
}

impl Evm {
    pub fn new(message: Message) -> Self {
        Self {
            gas_left: message.gas,
            running: true,
            message,
            ..Default::default()
        }
    }

    /// Charges `cost` against the frame's budget. A shortfall zeroes the
    /// budget and halts the frame with `OutOfGas`.
    pub fn subtract_gas(&mut self, cost: U256) -> Result<(), VMError> {
        if cost > self.gas_left {
            self.gas_left = U256::zero();
            return Err(VMError::OutOfGas);
        }
        self.gas_left = self
            .gas_left
            .checked_sub(cost)
            .ok_or(InternalError::ArithmeticOperationOverflow)?;
        Ok(())
    }

    /// Prices and performs the memory expansion needed to address
    /// `[offset, offset + size)`. Free no-op when `size` is zero.
    pub fn touch_memory(&mut self, offset: U256, size: U256) -> Result<(), VMError> {
        let new_memory_size = memory::calculate_memory_size(offset, size)?;
        if new_memory_size.is_zero() {
            return Ok(());
        }
        let cost = gas_cost::memory_expansion_cost(new_memory_size, self.memory.len())?;
        self.subtract_gas(cost)?;

        let offset: usize = offset.try_into().map_err(|_| VMError::VeryLargeNumber)?;
        let size: usize = size.try_into().map_err(|_| VMError::VeryLargeNumber)?;
        let end = offset.checked_add(size).ok_or(VMError::VeryLargeNumber)?;
        self.memory.expand_to(end)
    }

    /// Reads `[offset, offset + size)` out of frame memory. The region must
    /// have been touched first.
    pub fn read_memory(&self, offset: U256, size: U256) -> Result<Bytes, VMError> {
        if size.is_zero() {
            return Ok(Bytes::new());
        }
        let offset: usize = offset.try_into().map_err(|_| VMError::VeryLargeNumber)?;
        let size: usize = size.try_into().map_err(|_| VMError::VeryLargeNumber)?;
        Ok(Bytes::from(self.memory.load_range(offset, size)))
    }

    /// Writes `data` into frame memory at `offset`. The region must have been
    /// touched first.
    pub fn write_memory(&mut self, offset: U256, data: &[u8]) -> Result<(), VMError> {
        if data.is_empty() {
            return Ok(());
        }
        let offset: usize = offset.try_into().map_err(|_| VMError::VeryLargeNumber)?;
        self.memory.store_data(offset, data);
        Ok(())
    }

    /// Byte under the program counter, if any. Running past the end of code
    /// is the implicit STOP.
    pub fn next_opcode_byte(&self) -> Option<u8> {
        self.message.code.get(self.pc).copied()
    }

    pub fn increment_pc_by(&mut self, count: usize) -> Result<(), VMError> {
        self.pc = self
            .pc
            .checked_add(count)
            .ok_or(VMError::Internal(InternalError::PCOverflowed))?;
        Ok(())
    }

    pub fn increment_pc(&mut self) -> Result<(), VMError> {
        self.increment_pc_by(1)
    }
}
