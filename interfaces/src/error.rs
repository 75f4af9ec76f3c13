use perp_types::Address;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("insufficient {token} balance for {holder}: need {needed}, have {available}")]
    InsufficientBalance {
        token: Address,
        holder: Address,
        needed: u128,
        available: u128,
    },

    #[error("bond {0} not found")]
    UnknownBond(Address),

    #[error("tranche {0} not found")]
    UnknownTranche(Address),

    #[error("bond {bond} has no tranche at index {index}")]
    TrancheIndexOutOfRange { bond: Address, index: usize },

    #[error("bond {0} has not reached maturity")]
    BondNotMature(Address),

    #[error("bond {0} is already mature")]
    BondAlreadyMature(Address),

    #[error("arithmetic overflow in ledger operation")]
    Overflow,
}
