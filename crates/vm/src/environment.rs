use ethereum_types::{Address, U256};

/// Per-transaction context shared by every frame in the tree. Immutable for
/// the duration of the transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// The externally-owned account that signed the transaction.
    pub origin: Address,
    /// Price per unit of gas, as agreed in the transaction.
    pub gas_price: U256,
}

impl Environment {
    pub fn new(origin: Address, gas_price: U256) -> Self {
        Self { origin, gas_price }
    }
}
