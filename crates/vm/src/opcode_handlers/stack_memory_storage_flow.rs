use crate::{
    call_frame::Evm,
    constants::WORD_SIZE_IN_BYTES,
    errors::{OpcodeResult, VMError},
    gas_cost,
    vm::Vm,
};
use ethereum_types::U256;

// Stack and Memory Operations (5)
// Opcodes: POP, MLOAD, MSTORE, MSTORE8, MSIZE

impl<'a> Vm<'a> {
    // POP operation
    pub fn op_pop(&mut self, evm: &mut Evm) -> Result<OpcodeResult, VMError> {
        evm.subtract_gas(gas_cost::POP)?;

        evm.stack.pop()?;

        evm.increment_pc()?;
        Ok(OpcodeResult::Continue)
    }

    // MLOAD operation
    pub fn op_mload(&mut self, evm: &mut Evm) -> Result<OpcodeResult, VMError> {
        evm.subtract_gas(gas_cost::MLOAD_STATIC)?;

        let offset = evm.stack.pop()?;
        evm.touch_memory(offset, WORD_SIZE_IN_BYTES)?;

        let word = evm.read_memory(offset, WORD_SIZE_IN_BYTES)?;
        evm.stack.push(U256::from_big_endian(&word))?;

        evm.increment_pc()?;
        Ok(OpcodeResult::Continue)
    }

    // MSTORE operation
    pub fn op_mstore(&mut self, evm: &mut Evm) -> Result<OpcodeResult, VMError> {
        evm.subtract_gas(gas_cost::MSTORE_STATIC)?;

        let offset = evm.stack.pop()?;
        let value = evm.stack.pop()?;
        evm.touch_memory(offset, WORD_SIZE_IN_BYTES)?;

        evm.write_memory(offset, &value.to_big_endian())?;

        evm.increment_pc()?;
        Ok(OpcodeResult::Continue)
    }

    // MSTORE8 operation
    pub fn op_mstore8(&mut self, evm: &mut Evm) -> Result<OpcodeResult, VMError> {
        evm.subtract_gas(gas_cost::MSTORE8_STATIC)?;

        let offset = evm.stack.pop()?;
        let value = evm.stack.pop()?;
        evm.touch_memory(offset, U256::one())?;

        evm.write_memory(offset, &[value.byte(0)])?;

        evm.increment_pc()?;
        Ok(OpcodeResult::Continue)
    }

    // MSIZE operation
    pub fn op_msize(&mut self, evm: &mut Evm) -> Result<OpcodeResult, VMError> {
        evm.subtract_gas(gas_cost::MSIZE)?;

        evm.stack.push(U256::from(evm.memory.len()))?;

        evm.increment_pc()?;
        Ok(OpcodeResult::Continue)
    }
}
