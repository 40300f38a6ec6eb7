//! Gas schedule of the Frontier fork (in units of gas).
use crate::{
    constants::WORD_SIZE,
    errors::{InternalError, VMError},
};
use ethereum_types::{U256, U512};

pub const STOP: U256 = U256([0, 0, 0, 0]);
pub const ADDRESS: U256 = U256([2, 0, 0, 0]);
pub const ORIGIN: U256 = U256([2, 0, 0, 0]);
pub const CALLER: U256 = U256([2, 0, 0, 0]);
pub const CALLVALUE: U256 = U256([2, 0, 0, 0]);
pub const CALLDATASIZE: U256 = U256([2, 0, 0, 0]);
pub const CODESIZE: U256 = U256([2, 0, 0, 0]);
pub const GASPRICE: U256 = U256([2, 0, 0, 0]);
pub const BALANCE: U256 = U256([20, 0, 0, 0]);
pub const EXTCODESIZE: U256 = U256([20, 0, 0, 0]);
pub const CALLDATALOAD: U256 = U256([3, 0, 0, 0]);
pub const POP: U256 = U256([2, 0, 0, 0]);
pub const MSIZE: U256 = U256([2, 0, 0, 0]);
pub const PUSHN: U256 = U256([3, 0, 0, 0]);
pub const DUPN: U256 = U256([3, 0, 0, 0]);
pub const SWAPN: U256 = U256([3, 0, 0, 0]);
pub const MLOAD_STATIC: U256 = U256([3, 0, 0, 0]);
pub const MSTORE_STATIC: U256 = U256([3, 0, 0, 0]);
pub const MSTORE8_STATIC: U256 = U256([3, 0, 0, 0]);
pub const RETURN: U256 = U256([0, 0, 0, 0]);
pub const SELFDESTRUCT: U256 = U256([0, 0, 0, 0]);

pub const CALLDATACOPY_STATIC: U256 = U256([3, 0, 0, 0]);
pub const CODECOPY_STATIC: U256 = U256([3, 0, 0, 0]);
pub const EXTCODECOPY_STATIC: U256 = U256([20, 0, 0, 0]);
/// Per 32-byte word moved by the copy family.
pub const COPY_DYNAMIC_BASE: U256 = U256([3, 0, 0, 0]);

pub const CREATE: U256 = U256([32000, 0, 0, 0]);
pub const CALL: U256 = U256([40, 0, 0, 0]);
pub const CALL_VALUE: U256 = U256([9000, 0, 0, 0]);
pub const NEW_ACCOUNT: U256 = U256([25000, 0, 0, 0]);
pub const CALL_STIPEND: U256 = U256([2300, 0, 0, 0]);
/// Per byte of code installed by a successful contract creation.
pub const CODE_DEPOSIT: U256 = U256([200, 0, 0, 0]);

/// Linear coefficient of the memory expansion curve; the quadratic term is
/// `words² / 512`.
pub const MEMORY: U256 = U256([3, 0, 0, 0]);
const MEMORY_QUADRATIC_DENOMINATOR: u64 = 512;

pub fn calldatacopy(size: U256) -> Result<U256, VMError> {
    copy_behavior(CALLDATACOPY_STATIC, size)
}

pub fn codecopy(size: U256) -> Result<U256, VMError> {
    copy_behavior(CODECOPY_STATIC, size)
}

pub fn extcodecopy(size: U256) -> Result<U256, VMError> {
    copy_behavior(EXTCODECOPY_STATIC, size)
}

/// `static + COPY · ⌈size / 32⌉`, widened so no operand can wrap. Overflow of
/// the total is an out-of-gas, never a silent wrap.
fn copy_behavior(static_cost: U256, size: U256) -> Result<U256, VMError> {
    let words = ceil_words(U512::from(size))?;
    let copy_cost = U512::from(COPY_DYNAMIC_BASE)
        .checked_mul(words)
        .ok_or(VMError::OutOfGas)?;
    let total = U512::from(static_cost)
        .checked_add(copy_cost)
        .ok_or(VMError::OutOfGas)?;
    U256::try_from(total).map_err(|_| VMError::OutOfGas)
}

/// Fee charged to the caller for CALL, and the gas handed to the child.
///
/// The caller pays the gas it grants on top of the base fee, plus surcharges
/// for transferring value and for conjuring the target account into
/// existence. The child receives the granted gas plus the value stipend.
pub fn call(gas: U256, value: U256, target_exists: bool) -> Result<(U256, U256), VMError> {
    let mut fee = gas.checked_add(CALL).ok_or(VMError::OutOfGas)?;
    if !target_exists {
        fee = fee.checked_add(NEW_ACCOUNT).ok_or(VMError::OutOfGas)?;
    }
    if !value.is_zero() {
        fee = fee.checked_add(CALL_VALUE).ok_or(VMError::OutOfGas)?;
    }
    let message_call_gas = message_call_gas(gas, value)?;
    Ok((fee, message_call_gas))
}

/// CALLCODE runs foreign code against the caller's own account, so the
/// new-account surcharge can never apply.
pub fn callcode(gas: U256, value: U256) -> Result<(U256, U256), VMError> {
    call(gas, value, true)
}

fn message_call_gas(gas: U256, value: U256) -> Result<U256, VMError> {
    if value.is_zero() {
        Ok(gas)
    } else {
        gas.checked_add(CALL_STIPEND).ok_or(VMError::OutOfGas)
    }
}

pub fn code_deposit(code_length: usize) -> Result<U256, VMError> {
    CODE_DEPOSIT
        .checked_mul(U256::from(code_length))
        .ok_or(VMError::OutOfGas)
}

/// Price of growing memory from `current_memory_size` (always word-aligned)
/// to `new_memory_size` bytes: the delta of `3·w + ⌊w²/512⌋` between the two
/// high-water marks. Zero when no growth happens.
pub fn memory_expansion_cost(
    new_memory_size: U512,
    current_memory_size: usize,
) -> Result<U256, VMError> {
    let current_memory_size = U512::from(current_memory_size);
    if new_memory_size <= current_memory_size {
        return Ok(U256::zero());
    }
    let new_cost = memory_cost(new_memory_size)?;
    let current_cost = memory_cost(current_memory_size)?;
    let expansion_cost = new_cost
        .checked_sub(current_cost)
        .ok_or(InternalError::ArithmeticOperationOverflow)?;
    U256::try_from(expansion_cost).map_err(|_| VMError::OutOfGas)
}

fn memory_cost(size_in_bytes: U512) -> Result<U512, VMError> {
    let words = size_in_bytes
        .checked_div(U512::from(WORD_SIZE))
        .ok_or(InternalError::ArithmeticOperationOverflow)?;
    let linear = words
        .checked_mul(U512::from(MEMORY))
        .ok_or(VMError::OutOfGas)?;
    let quadratic = words
        .checked_mul(words)
        .ok_or(VMError::OutOfGas)?
        .checked_div(U512::from(MEMORY_QUADRATIC_DENOMINATOR))
        .ok_or(InternalError::ArithmeticOperationOverflow)?;
    linear.checked_add(quadratic).ok_or(VMError::OutOfGas)
}

fn ceil_words(size_in_bytes: U512) -> Result<U512, VMError> {
    let word = U512::from(WORD_SIZE);
    size_in_bytes
        .checked_add(U512::from(31u8))
        .ok_or(VMError::OutOfGas)?
        .checked_div(word)
        .ok_or(InternalError::ArithmeticOperationOverflow.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_cost_rounds_up_to_words() {
        assert_eq!(calldatacopy(U256::zero()).unwrap(), U256::from(3));
        assert_eq!(calldatacopy(U256::from(1)).unwrap(), U256::from(6));
        assert_eq!(calldatacopy(U256::from(32)).unwrap(), U256::from(6));
        assert_eq!(calldatacopy(U256::from(33)).unwrap(), U256::from(9));
    }

    #[test]
    fn memory_curve_matches_reference_points() {
        // One word: 3. 32 words (1 KiB): 3*32 + 2 = 98.
        assert_eq!(
            memory_expansion_cost(U512::from(32), 0).unwrap(),
            U256::from(3)
        );
        assert_eq!(
            memory_expansion_cost(U512::from(1024), 0).unwrap(),
            U256::from(98)
        );
        // Growing 32 -> 64 bytes only pays the delta.
        assert_eq!(
            memory_expansion_cost(U512::from(64), 32).unwrap(),
            U256::from(3)
        );
        assert_eq!(memory_expansion_cost(U512::from(32), 32).unwrap(), U256::zero());
    }

    #[test]
    fn call_fee_includes_granted_gas_and_surcharges() {
        let (fee, child_gas) = call(U256::from(2300), U256::from(1), false).unwrap();
        assert_eq!(fee, U256::from(2300 + 40 + 25000 + 9000));
        assert_eq!(child_gas, U256::from(2300 + 2300));

        let (fee, child_gas) = call(U256::from(100), U256::zero(), true).unwrap();
        assert_eq!(fee, U256::from(140));
        assert_eq!(child_gas, U256::from(100));
    }

    #[test]
    fn cost_overflow_is_out_of_gas() {
        assert_eq!(call(U256::MAX, U256::from(1), true), Err(VMError::OutOfGas));
    }
}
