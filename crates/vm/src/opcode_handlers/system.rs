use crate::{
    call_frame::{Evm, Message},
    constants::{CREATE_DEPLOYMENT_FAIL, REVERT_FOR_CALL, STACK_DEPTH_LIMIT, SUCCESS_FOR_CALL},
    errors::{InternalError, OpcodeResult, VMError},
    gas_cost,
    utils::{
        account_has_code_or_nonce, account_exists, address_to_word, calculate_create_address,
        get_account, increment_account_nonce, set_account_balance, word_to_address,
    },
    vm::Vm,
};
use bytes::Bytes;
use ethereum_types::U256;

// System Operations (5)
// Opcodes: CREATE, CALL, CALLCODE, RETURN, SELFDESTRUCT

impl<'a> Vm<'a> {
    // CREATE operation
    pub fn op_create(&mut self, evm: &mut Evm) -> Result<OpcodeResult, VMError> {
        let endowment = evm.stack.pop()?;
        let code_offset = evm.stack.pop()?;
        let code_size = evm.stack.pop()?;

        evm.subtract_gas(gas_cost::CREATE)?;
        evm.touch_memory(code_offset, code_size)?;
        let init_code = evm.read_memory(code_offset, code_size)?;

        evm.increment_pc()?;

        let deployer = evm.message.current_target;
        let deployer_account = get_account(self.db, deployer);
        let new_depth = evm
            .message
            .depth
            .checked_add(1)
            .ok_or(InternalError::ArithmeticOperationOverflow)?;

        // Rejections that keep the remaining gas: balance shortfall, nonce
        // ceiling, frame depth.
        if deployer_account.info.balance < endowment
            || deployer_account.info.nonce == u64::MAX
            || new_depth > STACK_DEPTH_LIMIT
        {
            evm.stack.push(CREATE_DEPLOYMENT_FAIL)?;
            return Ok(OpcodeResult::Continue);
        }

        increment_account_nonce(self.db, deployer)?;

        // The child takes everything the frame has left.
        let create_message_gas = evm.gas_left;
        evm.subtract_gas(create_message_gas)?;

        let nonce = get_account(self.db, deployer)
            .info
            .nonce
            .checked_sub(1)
            .ok_or(InternalError::ArithmeticOperationOverflow)?;
        let contract_address = calculate_create_address(deployer, nonce)?;

        // Collision: the gas already moved to the child is burned, per
        // Frontier consensus.
        if account_has_code_or_nonce(self.db, contract_address) {
            evm.stack.push(CREATE_DEPLOYMENT_FAIL)?;
            return Ok(OpcodeResult::Continue);
        }

        let child_message = Message {
            caller: deployer,
            target: None,
            current_target: contract_address,
            code_address: None,
            gas: create_message_gas,
            value: endowment,
            data: Bytes::new(),
            code: init_code,
            depth: new_depth,
        };
        let mut child = self.process_create_message(child_message)?;

        if child.has_erred {
            evm.stack.push(CREATE_DEPLOYMENT_FAIL)?;
        } else {
            evm.logs.extend_from_slice(&child.logs);
            evm.accounts_to_delete
                .extend(child.accounts_to_delete.iter().copied());
            evm.stack.push(address_to_word(child.message.current_target))?;
        }
        evm.gas_left = child.gas_left;
        child.gas_left = U256::zero();
        evm.children.push(child);

        Ok(OpcodeResult::Continue)
    }

    // CALL operation
    pub fn op_call(&mut self, evm: &mut Evm) -> Result<OpcodeResult, VMError> {
        let gas = evm.stack.pop()?;
        let callee = word_to_address(evm.stack.pop()?);
        let value = evm.stack.pop()?;
        let args_offset = evm.stack.pop()?;
        let args_size = evm.stack.pop()?;
        let return_data_offset = evm.stack.pop()?;
        let return_data_size = evm.stack.pop()?;

        evm.touch_memory(args_offset, args_size)?;
        evm.touch_memory(return_data_offset, return_data_size)?;
        let call_data = evm.read_memory(args_offset, args_size)?;

        let (call_gas_fee, message_call_gas) =
            gas_cost::call(gas, value, account_exists(self.db, callee))?;
        evm.subtract_gas(call_gas_fee)?;

        evm.increment_pc()?;

        let code = get_account(self.db, callee).code;
        let child_message = Message {
            caller: evm.message.current_target,
            target: Some(callee),
            current_target: callee,
            code_address: Some(callee),
            gas: message_call_gas,
            value,
            data: call_data,
            code,
            depth: evm.message.depth.checked_add(1).ok_or(InternalError::ArithmeticOperationOverflow)?,
        };
        self.generic_call(evm, child_message, return_data_offset, return_data_size)
    }

    // CALLCODE operation
    pub fn op_callcode(&mut self, evm: &mut Evm) -> Result<OpcodeResult, VMError> {
        let gas = evm.stack.pop()?;
        let code_address = word_to_address(evm.stack.pop()?);
        let value = evm.stack.pop()?;
        let args_offset = evm.stack.pop()?;
        let args_size = evm.stack.pop()?;
        let return_data_offset = evm.stack.pop()?;
        let return_data_size = evm.stack.pop()?;

        evm.touch_memory(args_offset, args_size)?;
        evm.touch_memory(return_data_offset, return_data_size)?;
        let call_data = evm.read_memory(args_offset, args_size)?;

        // The storage and balance stay the caller's own, so the new-account
        // surcharge never applies; the value check still does.
        let (call_gas_fee, message_call_gas) = gas_cost::callcode(gas, value)?;
        evm.subtract_gas(call_gas_fee)?;

        evm.increment_pc()?;

        let code = get_account(self.db, code_address).code;
        let child_message = Message {
            caller: evm.message.current_target,
            target: Some(evm.message.current_target),
            current_target: evm.message.current_target,
            code_address: Some(code_address),
            gas: message_call_gas,
            value,
            data: call_data,
            code,
            depth: evm.message.depth.checked_add(1).ok_or(InternalError::ArithmeticOperationOverflow)?,
        };
        self.generic_call(evm, child_message, return_data_offset, return_data_size)
    }

    // RETURN operation
    pub fn op_return(&mut self, evm: &mut Evm) -> Result<OpcodeResult, VMError> {
        let offset = evm.stack.pop()?;
        let size = evm.stack.pop()?;

        evm.subtract_gas(gas_cost::RETURN)?;
        evm.touch_memory(offset, size)?;

        evm.output = evm.read_memory(offset, size)?;

        Ok(OpcodeResult::Halt)
    }

    // SELFDESTRUCT operation
    pub fn op_selfdestruct(&mut self, evm: &mut Evm) -> Result<OpcodeResult, VMError> {
        evm.subtract_gas(gas_cost::SELFDESTRUCT)?;

        let beneficiary = word_to_address(evm.stack.pop()?);
        let originator = evm.message.current_target;

        let beneficiary_balance = get_account(self.db, beneficiary).info.balance;
        let originator_balance = get_account(self.db, originator).info.balance;

        // Credit the beneficiary first, then zero the originator: when the
        // contract names itself the net balance must come out zero.
        set_account_balance(
            self.db,
            beneficiary,
            beneficiary_balance
                .checked_add(originator_balance)
                .ok_or(VMError::BalanceOverflow)?,
        );
        set_account_balance(self.db, originator, U256::zero());

        evm.accounts_to_delete.insert(originator);

        Ok(OpcodeResult::Halt)
    }

    /// Shared tail of CALL and CALLCODE: run the child frame, fold its
    /// result into the parent, copy its output into the reserved region.
    fn generic_call(
        &mut self,
        evm: &mut Evm,
        child_message: Message,
        return_data_offset: U256,
        return_data_size: U256,
    ) -> Result<OpcodeResult, VMError> {
        let sender_balance = get_account(self.db, evm.message.current_target)
            .info
            .balance;

        // Rejections that refund the child's whole budget (stipend included).
        if sender_balance < child_message.value || child_message.depth > STACK_DEPTH_LIMIT {
            evm.stack.push(REVERT_FOR_CALL)?;
            evm.gas_left = evm
                .gas_left
                .checked_add(child_message.gas)
                .ok_or(InternalError::ArithmeticOperationOverflow)?;
            return Ok(OpcodeResult::Continue);
        }

        let mut child = self.process_message(child_message)?;

        if child.has_erred {
            evm.stack.push(REVERT_FOR_CALL)?;
        } else {
            evm.logs.extend_from_slice(&child.logs);
            evm.accounts_to_delete
                .extend(child.accounts_to_delete.iter().copied());
            evm.stack.push(SUCCESS_FOR_CALL)?;
        }

        let return_data_size: usize = return_data_size
            .try_into()
            .map_err(|_| VMError::VeryLargeNumber)?;
        let copy_size = return_data_size.min(child.output.len());
        if let Some(slice) = child.output.get(..copy_size) {
            evm.write_memory(return_data_offset, slice)?;
        }

        evm.gas_left = evm
            .gas_left
            .checked_add(child.gas_left)
            .ok_or(InternalError::ArithmeticOperationOverflow)?;
        child.gas_left = U256::zero();
        evm.children.push(child);

        Ok(OpcodeResult::Continue)
    }
}
