use crate::{
    call_frame::Evm,
    errors::{InternalError, OpcodeResult, VMError},
    gas_cost,
    opcodes::Opcode,
    vm::Vm,
};

// Duplication Operations (16)
// Opcodes: DUP1 .. DUP16

impl<'a> Vm<'a> {
    pub fn op_dup(&mut self, evm: &mut Evm, op: Opcode) -> Result<OpcodeResult, VMError> {
        evm.subtract_gas(gas_cost::DUPN)?;

        let depth = usize::from(
            u8::from(op)
                .checked_sub(u8::from(Opcode::DUP1))
                .ok_or(InternalError::ConversionError)?,
        )
        .checked_add(1)
        .ok_or(InternalError::ArithmeticOperationOverflow)?;

        let index = evm
            .stack
            .len()
            .checked_sub(depth)
            .ok_or(VMError::StackUnderflow)?;
        let value = *evm.stack.get(index)?;
        evm.stack.push(value)?;

        evm.increment_pc()?;
        Ok(OpcodeResult::Continue)
    }
}
