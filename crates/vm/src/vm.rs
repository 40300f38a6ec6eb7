use crate::{
    call_frame::{Evm, Message},
    db::GeneralizedDatabase,
    environment::Environment,
    errors::{OpcodeResult, VMError},
    gas_cost,
    opcodes::Opcode,
    utils::{get_account_mut, transfer},
};
use bytes::Bytes;
use ethereum_types::U256;
use tracing::{debug, trace};

/// Execution context shared by every frame of a transaction: the immutable
/// transaction environment and the journaled world state.
///
/// Frames run one at a time; CALL, CALLCODE and CREATE re-enter
/// [`Vm::process_message`] / [`Vm::process_create_message`] for the child and
/// block until it finishes.
pub struct Vm<'a> {
    pub env: &'a Environment,
    pub db: &'a mut GeneralizedDatabase,
}

impl<'a> Vm<'a> {
    pub fn new(env: &'a Environment, db: &'a mut GeneralizedDatabase) -> Self {
        Self { env, db }
    }

    /// Runs one message frame to completion.
    ///
    /// The frame's state writes (and its descendants') commit atomically on
    /// normal halt and are all discarded on exceptional halt. Exceptional
    /// halts do not surface as `Err`: the returned frame carries
    /// `has_erred = true` with `gas_left` zeroed. `Err` is reserved for
    /// engine defects.
    pub fn process_message(&mut self, message: Message) -> Result<Evm, VMError> {
        let backup = self.db.begin_transaction();

        if !message.value.is_zero() {
            // Callers have checked the balance; a debit-before-credit pair
            // keeps the self-transfer of CALLCODE a net no-op.
            transfer(self.db, message.caller, message.current_target, message.value)?;
        }

        let evm = self.execute_code(message)?;

        if evm.has_erred {
            self.db.rollback(backup);
        } else {
            self.db.commit(backup);
        }
        Ok(evm)
    }

    /// Runs a contract-creation frame: a message frame whose output, if it
    /// halts normally and can pay the deposit fee, becomes the account code
    /// of the created contract.
    pub fn process_create_message(&mut self, message: Message) -> Result<Evm, VMError> {
        let backup = self.db.begin_transaction();
        let mut evm = self.process_message(message)?;

        if evm.has_erred {
            self.db.rollback(backup);
            return Ok(evm);
        }

        let deposit = gas_cost::code_deposit(evm.output.len())
            .and_then(|fee| evm.subtract_gas(fee));
        match deposit {
            Ok(()) => {
                let contract_code = evm.output.clone();
                get_account_mut(self.db, evm.message.current_target).code = contract_code;
                self.db.commit(backup);
            }
            Err(VMError::Internal(error)) => return Err(error.into()),
            Err(_) => {
                // Not enough gas to install the code: the whole creation
                // fails, not just the deposit.
                trace!(
                    address = ?evm.message.current_target,
                    "contract creation failed paying the code deposit"
                );
                exceptional_halt(&mut evm);
                self.db.rollback(backup);
            }
        }
        Ok(evm)
    }

    /// The dispatch loop. Fetches the byte under `pc`, runs its handler, and
    /// folds handler errors into the frame. Handlers advance `pc` themselves;
    /// running off the end of code is the implicit STOP.
    fn execute_code(&mut self, message: Message) -> Result<Evm, VMError> {
        let mut evm = Evm::new(message);
        debug!(
            depth = evm.message.depth,
            address = ?evm.message.current_target,
            gas = %evm.gas_left,
            "frame start"
        );

        while evm.running {
            let Some(byte) = evm.next_opcode_byte() else {
                evm.running = false;
                break;
            };

            let op_result = Opcode::try_from(byte)
                .and_then(|opcode| self.handle_opcode(&mut evm, opcode));

            match op_result {
                Ok(OpcodeResult::Continue) => {}
                Ok(OpcodeResult::Halt) => evm.running = false,
                Err(VMError::Internal(error)) => return Err(error.into()),
                Err(error) => {
                    trace!(depth = evm.message.depth, %error, "exceptional halt");
                    exceptional_halt(&mut evm);
                }
            }
        }

        debug!(
            depth = evm.message.depth,
            erred = evm.has_erred,
            gas = %evm.gas_left,
            "frame end"
        );
        Ok(evm)
    }

    fn handle_opcode(&mut self, evm: &mut Evm, opcode: Opcode) -> Result<OpcodeResult, VMError> {
        match opcode {
            Opcode::STOP => Ok(OpcodeResult::Halt),
            Opcode::ADDRESS => self.op_address(evm),
            Opcode::BALANCE => self.op_balance(evm),
            Opcode::ORIGIN => self.op_origin(evm),
            Opcode::CALLER => self.op_caller(evm),
            Opcode::CALLVALUE => self.op_callvalue(evm),
            Opcode::CALLDATALOAD => self.op_calldataload(evm),
            Opcode::CALLDATASIZE => self.op_calldatasize(evm),
            Opcode::CALLDATACOPY => self.op_calldatacopy(evm),
            Opcode::CODESIZE => self.op_codesize(evm),
            Opcode::CODECOPY => self.op_codecopy(evm),
            Opcode::GASPRICE => self.op_gasprice(evm),
            Opcode::EXTCODESIZE => self.op_extcodesize(evm),
            Opcode::EXTCODECOPY => self.op_extcodecopy(evm),
            Opcode::POP => self.op_pop(evm),
            Opcode::MLOAD => self.op_mload(evm),
            Opcode::MSTORE => self.op_mstore(evm),
            Opcode::MSTORE8 => self.op_mstore8(evm),
            Opcode::MSIZE => self.op_msize(evm),
            op if (Opcode::PUSH1..=Opcode::PUSH32).contains(&op) => self.op_push(evm, op),
            op if (Opcode::DUP1..=Opcode::DUP16).contains(&op) => self.op_dup(evm, op),
            op if (Opcode::SWAP1..=Opcode::SWAP16).contains(&op) => self.op_swap(evm, op),
            Opcode::CREATE => self.op_create(evm),
            Opcode::CALL => self.op_call(evm),
            Opcode::CALLCODE => self.op_callcode(evm),
            Opcode::RETURN => self.op_return(evm),
            Opcode::SELFDESTRUCT => self.op_selfdestruct(evm),
            _ => Err(VMError::InvalidOpcode),
        }
    }
}

/// Folds an exceptional halt into the frame: gas burned, output and merged
/// child results dropped. The caller discards the state writes.
fn exceptional_halt(evm: &mut Evm) {
    evm.has_erred = true;
    evm.running = false;
    evm.gas_left = U256::zero();
    evm.output = Bytes::new();
    evm.logs.clear();
    evm.accounts_to_delete.clear();
}
