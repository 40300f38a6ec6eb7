use crate::{
    call_frame::Evm,
    errors::{InternalError, OpcodeResult, VMError},
    gas_cost,
    opcodes::Opcode,
    vm::Vm,
};

// Exchange Operations (16)
// Opcodes: SWAP1 .. SWAP16

impl<'a> Vm<'a> {
    pub fn op_swap(&mut self, evm: &mut Evm, op: Opcode) -> Result<OpcodeResult, VMError> {
        evm.subtract_gas(gas_cost::SWAPN)?;

        let depth = usize::from(
            u8::from(op)
                .checked_sub(u8::from(Opcode::SWAP1))
                .ok_or(InternalError::ConversionError)?,
        )
        .checked_add(1)
        .ok_or(InternalError::ArithmeticOperationOverflow)?;

        let top = evm
            .stack
            .len()
            .checked_sub(1)
            .ok_or(VMError::StackUnderflow)?;
        let swapped = top.checked_sub(depth).ok_or(VMError::StackUnderflow)?;
        evm.stack.swap(top, swapped)?;

        evm.increment_pc()?;
        Ok(OpcodeResult::Continue)
    }
}
