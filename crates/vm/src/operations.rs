use crate::opcodes::Opcode;
use bytes::Bytes;
use ethereum_types::U256;

/// Symbolic instructions for assembling test bytecode without hand-writing
/// opcode bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Stop,
    Address,
    Balance,
    Origin,
    Caller,
    Callvalue,
    CallDataLoad,
    CallDataSize,
    CallDataCopy,
    Codesize,
    Codecopy,
    Gasprice,
    ExtcodeSize,
    ExtcodeCopy,
    Pop,
    Mload,
    Mstore,
    Mstore8,
    Msize,
    /// `(n, value)` pushes the low `n` bytes of `value`, `n` in `1..=32`.
    Push((u8, U256)),
    /// Depth in `1..=16`.
    Dup(u8),
    /// Depth in `1..=16`.
    Swap(u8),
    Create,
    Call,
    CallCode,
    Return,
    SelfDestruct,
}

impl Operation {
    pub fn to_bytecode(&self) -> Bytes {
        match self {
            Operation::Stop => Bytes::copy_from_slice(&[u8::from(Opcode::STOP)]),
            Operation::Address => Bytes::copy_from_slice(&[u8::from(Opcode::ADDRESS)]),
            Operation::Balance => Bytes::copy_from_slice(&[u8::from(Opcode::BALANCE)]),
            Operation::Origin => Bytes::copy_from_slice(&[u8::from(Opcode::ORIGIN)]),
            Operation::Caller => Bytes::copy_from_slice(&[u8::from(Opcode::CALLER)]),
            Operation::Callvalue => Bytes::copy_from_slice(&[u8::from(Opcode::CALLVALUE)]),
            Operation::CallDataLoad => Bytes::copy_from_slice(&[u8::from(Opcode::CALLDATALOAD)]),
            Operation::CallDataSize => Bytes::copy_from_slice(&[u8::from(Opcode::CALLDATASIZE)]),
            Operation::CallDataCopy => Bytes::copy_from_slice(&[u8::from(Opcode::CALLDATACOPY)]),
            Operation::Codesize => Bytes::copy_from_slice(&[u8::from(Opcode::CODESIZE)]),
            Operation::Codecopy => Bytes::copy_from_slice(&[u8::from(Opcode::CODECOPY)]),
            Operation::Gasprice => Bytes::copy_from_slice(&[u8::from(Opcode::GASPRICE)]),
            Operation::ExtcodeSize => Bytes::copy_from_slice(&[u8::from(Opcode::EXTCODESIZE)]),
            Operation::ExtcodeCopy => Bytes::copy_from_slice(&[u8::from(Opcode::EXTCODECOPY)]),
            Operation::Pop => Bytes::copy_from_slice(&[u8::from(Opcode::POP)]),
            Operation::Mload => Bytes::copy_from_slice(&[u8::from(Opcode::MLOAD)]),
            Operation::Mstore => Bytes::copy_from_slice(&[u8::from(Opcode::MSTORE)]),
            Operation::Mstore8 => Bytes::copy_from_slice(&[u8::from(Opcode::MSTORE8)]),
            Operation::Msize => Bytes::copy_from_slice(&[u8::from(Opcode::MSIZE)]),
            Operation::Push((n_bytes, value)) => {
                let n_bytes = usize::from(*n_bytes).clamp(1, 32);
                let opcode = u8::from(Opcode::PUSH1).saturating_add(u8::try_from(n_bytes).unwrap_or(1)).saturating_sub(1);
                let word = value.to_big_endian();
                let start = word.len().saturating_sub(n_bytes);
                let mut bytecode = vec![opcode];
                bytecode.extend_from_slice(word.get(start..).unwrap_or_default());
                Bytes::from(bytecode)
            }
            Operation::Dup(depth) => {
                let depth = (*depth).clamp(1, 16);
                let opcode = u8::from(Opcode::DUP1).saturating_add(depth).saturating_sub(1);
                Bytes::copy_from_slice(&[opcode])
            }
            Operation::Swap(depth) => {
                let depth = (*depth).clamp(1, 16);
                let opcode = u8::from(Opcode::SWAP1).saturating_add(depth).saturating_sub(1);
                Bytes::copy_from_slice(&[opcode])
            }
            Operation::Create => Bytes::copy_from_slice(&[u8::from(Opcode::CREATE)]),
            Operation::Call => Bytes::copy_from_slice(&[u8::from(Opcode::CALL)]),
            Operation::CallCode => Bytes::copy_from_slice(&[u8::from(Opcode::CALLCODE)]),
            Operation::Return => Bytes::copy_from_slice(&[u8::from(Opcode::RETURN)]),
            Operation::SelfDestruct => Bytes::copy_from_slice(&[u8::from(Opcode::SELFDESTRUCT)]),
        }
    }
}

/// Flattens a program into executable bytecode.
pub fn ops_to_bytecode(operations: &[Operation]) -> Bytes {
    operations
        .iter()
        .flat_map(|op| op.to_bytecode())
        .collect::<Bytes>()
}
