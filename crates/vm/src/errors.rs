use thiserror::Error;

/// Errors that exceptionally halt the current frame.
///
/// These never cross a frame boundary: the interpreter folds them into the
/// frame (`has_erred`, zeroed gas, reverted state) and the parent observes a
/// failed child, not an `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VMError {
    #[error("Stack underflow")]
    StackUnderflow,
    #[error("Stack overflow")]
    StackOverflow,
    #[error("Out of gas")]
    OutOfGas,
    #[error("Invalid opcode")]
    InvalidOpcode,
    #[error("Invalid jump destination")]
    InvalidJumpDestination,
    #[error("Operand does not fit the machine's address space")]
    VeryLargeNumber,
    #[error("Balance overflow")]
    BalanceOverflow,
    #[error("Balance underflow")]
    BalanceUnderflow,
    #[error("Internal error: {0}")]
    Internal(#[from] InternalError),
}

/// Defects in the engine itself. Unlike the other `VMError` kinds these are
/// not consensus outcomes; they propagate out of the interpreter as `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    #[error("Arithmetic operation overflowed")]
    ArithmeticOperationOverflow,
    #[error("Conversion error")]
    ConversionError,
    #[error("Program counter overflowed")]
    PCOverflowed,
    #[error("Could not compute contract address")]
    CouldNotComputeCreateAddress,
}

/// What an opcode handler asks the driver to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpcodeResult {
    /// Keep fetching. The handler has already advanced `pc`.
    Continue,
    /// Normal halt (STOP, RETURN, SELFDESTRUCT). `pc` is meaningless from
    /// here on.
    Halt,
}
