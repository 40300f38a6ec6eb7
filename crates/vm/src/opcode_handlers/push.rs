use crate::{
    call_frame::Evm,
    errors::{InternalError, OpcodeResult, VMError},
    gas_cost,
    opcodes::Opcode,
    vm::Vm,
};
use ethereum_types::U256;

// Push Operations (32)
// Opcodes: PUSH1 .. PUSH32

impl<'a> Vm<'a> {
    pub fn op_push(&mut self, evm: &mut Evm, op: Opcode) -> Result<OpcodeResult, VMError> {
        evm.subtract_gas(gas_cost::PUSHN)?;

        let n_bytes = usize::from(
            u8::from(op)
                .checked_sub(u8::from(Opcode::PUSH1))
                .ok_or(InternalError::ConversionError)?,
        )
        .checked_add(1)
        .ok_or(InternalError::ArithmeticOperationOverflow)?;

        // Immediates past the end of code read as zero, padded on the right.
        let start = evm
            .pc
            .checked_add(1)
            .ok_or(InternalError::PCOverflowed)?;
        let mut word = [0u8; 32];
        if let Some(slot) = word.get_mut(..n_bytes) {
            for (dst, byte) in slot
                .iter_mut()
                .zip(evm.message.code.iter().skip(start).take(n_bytes))
            {
                *dst = *byte;
            }
        }
        let value = U256::from_big_endian(word.get(..n_bytes).unwrap_or(&word));
        evm.stack.push(value)?;

        evm.increment_pc_by(
            n_bytes
                .checked_add(1)
                .ok_or(InternalError::ArithmeticOperationOverflow)?,
        )?;
        Ok(OpcodeResult::Continue)
    }
}
