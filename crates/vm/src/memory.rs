use crate::{
    constants::WORD_SIZE,
    errors::{InternalError, VMError},
};
use ethereum_types::{U256, U512};

/// Byte-addressed frame memory. Lazily expanded in 32-byte words; new bytes
/// materialize as zero. Expansion is priced by the caller (`Evm::touch_memory`)
/// before any growth happens here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Memory {
    data: Vec<u8>,
}

/// Word-aligned end of the region `[offset, offset + size)` in bytes.
///
/// Both operands are widened to 512 bits before the addition so a hostile
/// `offset + size` cannot wrap. A zero `size` never expands anything.
pub fn calculate_memory_size(offset: U256, size: U256) -> Result<U512, VMError> {
    if size.is_zero() {
        return Ok(U512::zero());
    }
    let end = U512::from(offset)
        .checked_add(U512::from(size))
        .ok_or(InternalError::ArithmeticOperationOverflow)?;
    ceil32(end)
}

fn ceil32(value: U512) -> Result<U512, VMError> {
    let word = U512::from(WORD_SIZE);
    let words = value
        .checked_add(
            word.checked_sub(U512::one())
                .ok_or(InternalError::ArithmeticOperationOverflow)?,
        )
        .ok_or(InternalError::ArithmeticOperationOverflow)?
        .checked_div(word)
        .ok_or(InternalError::ArithmeticOperationOverflow)?;
    words
        .checked_mul(word)
        .ok_or(InternalError::ArithmeticOperationOverflow)
        .map_err(VMError::from)
}

impl Memory {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Grows the buffer so that `end` is addressable, rounded up to the next
    /// word boundary. Gas for the growth must already have been charged.
    pub fn expand_to(&mut self, end: usize) -> Result<(), VMError> {
        let new_len = end
            .checked_next_multiple_of(WORD_SIZE)
            .ok_or(VMError::VeryLargeNumber)?;
        if new_len > self.data.len() {
            self.data.resize(new_len, 0);
        }
        Ok(())
    }

    /// Reads `size` bytes starting at `offset`. Bytes beyond the expanded
    /// region read as zero.
    pub fn load_range(&self, offset: usize, size: usize) -> Vec<u8> {
        let mut value = vec![0u8; size];
        if let Some(end) = offset.checked_add(size) {
            if let Some(src) = self.data.get(offset..end.min(self.data.len())) {
                if let Some(dst) = value.get_mut(..src.len()) {
                    dst.copy_from_slice(src);
                }
            }
        }
        value
    }

    pub fn load_word(&self, offset: usize) -> U256 {
        U256::from_big_endian(&self.load_range(offset, WORD_SIZE))
    }

    /// Writes `data` at `offset`. The region must already be expanded; writes
    /// that would fall outside it are truncated rather than grown.
    pub fn store_data(&mut self, offset: usize, data: &[u8]) {
        let len = self.data.len();
        if let Some(end) = offset.checked_add(data.len()) {
            if let Some(dst) = self.data.get_mut(offset..end.min(len)) {
                let take = dst.len();
                if let Some(src) = data.get(..take) {
                    dst.copy_from_slice(src);
                }
            }
        }
    }

    pub fn store_word(&mut self, offset: usize, value: U256) {
        self.store_data(offset, &value.to_big_endian());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_size_is_word_aligned() {
        let size = calculate_memory_size(U256::from(10), U256::from(1)).unwrap();
        assert_eq!(size, U512::from(32));
        let size = calculate_memory_size(U256::from(32), U256::from(33)).unwrap();
        assert_eq!(size, U512::from(96));
    }

    #[test]
    fn zero_size_never_expands() {
        let size = calculate_memory_size(U256::MAX, U256::zero()).unwrap();
        assert!(size.is_zero());
    }

    #[test]
    fn huge_offset_does_not_wrap() {
        let size = calculate_memory_size(U256::MAX, U256::MAX).unwrap();
        assert!(size > U512::from(U256::MAX));
    }

    #[test]
    fn reads_past_expansion_are_zero() {
        let mut memory = Memory::default();
        memory.expand_to(32).unwrap();
        memory.store_data(0, &[0xaa, 0xbb]);
        assert_eq!(memory.load_range(0, 2), vec![0xaa, 0xbb]);
        assert_eq!(memory.load_range(30, 4), vec![0, 0, 0, 0]);
    }

    #[test]
    fn word_round_trip() {
        let mut memory = Memory::default();
        memory.expand_to(64).unwrap();
        let value = U256::from(0xdeadbeefu64);
        memory.store_word(32, value);
        assert_eq!(memory.load_word(32), value);
        assert_eq!(memory.len(), 64);
    }
}
