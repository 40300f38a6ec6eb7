use crate::{
    call_frame::Evm,
    errors::{OpcodeResult, VMError},
    gas_cost,
    utils::{address_to_word, get_account, word_to_address},
    vm::Vm,
};
use ethereum_types::U256;

// Environmental Information (13)
// Opcodes: ADDRESS, BALANCE, ORIGIN, CALLER, CALLVALUE, CALLDATALOAD,
// CALLDATASIZE, CALLDATACOPY, CODESIZE, CODECOPY, GASPRICE, EXTCODESIZE,
// EXTCODECOPY

impl<'a> Vm<'a> {
    // ADDRESS operation
    pub fn op_address(&mut self, evm: &mut Evm) -> Result<OpcodeResult, VMError> {
        evm.subtract_gas(gas_cost::ADDRESS)?;

        evm.stack.push(address_to_word(evm.message.current_target))?;

        evm.increment_pc()?;
        Ok(OpcodeResult::Continue)
    }

    // BALANCE operation
    pub fn op_balance(&mut self, evm: &mut Evm) -> Result<OpcodeResult, VMError> {
        evm.subtract_gas(gas_cost::BALANCE)?;

        let address = word_to_address(evm.stack.pop()?);
        // Absent accounts read as empty, so this is 0 rather than an error.
        let balance = get_account(self.db, address).info.balance;
        evm.stack.push(balance)?;

        evm.increment_pc()?;
        Ok(OpcodeResult::Continue)
    }

    // ORIGIN operation
    pub fn op_origin(&mut self, evm: &mut Evm) -> Result<OpcodeResult, VMError> {
        evm.subtract_gas(gas_cost::ORIGIN)?;

        evm.stack.push(address_to_word(self.env.origin))?;

        evm.increment_pc()?;
        Ok(OpcodeResult::Continue)
    }

    // CALLER operation
    pub fn op_caller(&mut self, evm: &mut Evm) -> Result<OpcodeResult, VMError> {
        evm.subtract_gas(gas_cost::CALLER)?;

        evm.stack.push(address_to_word(evm.message.caller))?;

        evm.increment_pc()?;
        Ok(OpcodeResult::Continue)
    }

    // CALLVALUE operation
    pub fn op_callvalue(&mut self, evm: &mut Evm) -> Result<OpcodeResult, VMError> {
        evm.subtract_gas(gas_cost::CALLVALUE)?;

        evm.stack.push(evm.message.value)?;

        evm.increment_pc()?;
        Ok(OpcodeResult::Continue)
    }

    // CALLDATALOAD operation
    pub fn op_calldataload(&mut self, evm: &mut Evm) -> Result<OpcodeResult, VMError> {
        evm.subtract_gas(gas_cost::CALLDATALOAD)?;

        let offset = evm.stack.pop()?;

        // Bytes past the end of calldata read as zero.
        let mut word = [0u8; 32];
        if let Ok(offset) = usize::try_from(offset) {
            for (slot, byte) in word
                .iter_mut()
                .zip(evm.message.data.iter().skip(offset).take(32))
            {
                *slot = *byte;
            }
        }
        evm.stack.push(U256::from_big_endian(&word))?;

        evm.increment_pc()?;
        Ok(OpcodeResult::Continue)
    }

    // CALLDATASIZE operation
    pub fn op_calldatasize(&mut self, evm: &mut Evm) -> Result<OpcodeResult, VMError> {
        evm.subtract_gas(gas_cost::CALLDATASIZE)?;

        evm.stack.push(U256::from(evm.message.data.len()))?;

        evm.increment_pc()?;
        Ok(OpcodeResult::Continue)
    }

    // CALLDATACOPY operation
    pub fn op_calldatacopy(&mut self, evm: &mut Evm) -> Result<OpcodeResult, VMError> {
        let dest_offset = evm.stack.pop()?;
        let data_offset = evm.stack.pop()?;
        let size = evm.stack.pop()?;

        evm.subtract_gas(gas_cost::calldatacopy(size)?)?;
        evm.touch_memory(dest_offset, size)?;

        evm.increment_pc()?;

        if size.is_zero() {
            return Ok(OpcodeResult::Continue);
        }

        let data = copy_with_zero_fill(&evm.message.data, data_offset, size)?;
        evm.write_memory(dest_offset, &data)?;

        Ok(OpcodeResult::Continue)
    }

    // CODESIZE operation
    pub fn op_codesize(&mut self, evm: &mut Evm) -> Result<OpcodeResult, VMError> {
        evm.subtract_gas(gas_cost::CODESIZE)?;

        evm.stack.push(U256::from(evm.message.code.len()))?;

        evm.increment_pc()?;
        Ok(OpcodeResult::Continue)
    }

    // CODECOPY operation
    pub fn op_codecopy(&mut self, evm: &mut Evm) -> Result<OpcodeResult, VMError> {
        let dest_offset = evm.stack.pop()?;
        let code_offset = evm.stack.pop()?;
        let size = evm.stack.pop()?;

        evm.subtract_gas(gas_cost::codecopy(size)?)?;
        evm.touch_memory(dest_offset, size)?;

        evm.increment_pc()?;

        if size.is_zero() {
            return Ok(OpcodeResult::Continue);
        }

        let data = copy_with_zero_fill(&evm.message.code, code_offset, size)?;
        evm.write_memory(dest_offset, &data)?;

        Ok(OpcodeResult::Continue)
    }

    // GASPRICE operation
    pub fn op_gasprice(&mut self, evm: &mut Evm) -> Result<OpcodeResult, VMError> {
        evm.subtract_gas(gas_cost::GASPRICE)?;

        evm.stack.push(self.env.gas_price)?;

        evm.increment_pc()?;
        Ok(OpcodeResult::Continue)
    }

    // EXTCODESIZE operation
    pub fn op_extcodesize(&mut self, evm: &mut Evm) -> Result<OpcodeResult, VMError> {
        evm.subtract_gas(gas_cost::EXTCODESIZE)?;

        let address = word_to_address(evm.stack.pop()?);
        let code_size = get_account(self.db, address).code.len();
        evm.stack.push(U256::from(code_size))?;

        evm.increment_pc()?;
        Ok(OpcodeResult::Continue)
    }

    // EXTCODECOPY operation
    pub fn op_extcodecopy(&mut self, evm: &mut Evm) -> Result<OpcodeResult, VMError> {
        let address = word_to_address(evm.stack.pop()?);
        let dest_offset = evm.stack.pop()?;
        let code_offset = evm.stack.pop()?;
        let size = evm.stack.pop()?;

        evm.subtract_gas(gas_cost::extcodecopy(size)?)?;
        evm.touch_memory(dest_offset, size)?;

        evm.increment_pc()?;

        if size.is_zero() {
            return Ok(OpcodeResult::Continue);
        }

        let code = get_account(self.db, address).code;
        let data = copy_with_zero_fill(&code, code_offset, size)?;
        evm.write_memory(dest_offset, &data)?;

        Ok(OpcodeResult::Continue)
    }
}

/// `size` bytes of `source` starting at `offset`, right-padded with zeros
/// wherever the source runs out. `size` is known to fit in memory by the
/// time this runs.
fn copy_with_zero_fill(source: &[u8], offset: U256, size: U256) -> Result<Vec<u8>, VMError> {
    let size: usize = size.try_into().map_err(|_| VMError::VeryLargeNumber)?;
    let mut data = vec![0u8; size];
    if let Ok(offset) = usize::try_from(offset) {
        for (slot, byte) in data
            .iter_mut()
            .zip(source.iter().skip(offset).take(size))
        {
            *slot = *byte;
        }
    }
    Ok(data)
}
