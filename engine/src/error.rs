//! Reserve engine errors.

use perp_interfaces::ChainError;
use perp_types::{Address, ParamsError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PerpError {
    // ── Authorization ────────────────────────────────────────────────────
    #[error("caller {0} is not authorized for this call")]
    UnauthorizedCall(Address),

    // ── Configuration ────────────────────────────────────────────────────
    #[error("zero address is not an acceptable reference")]
    UnacceptableReference,

    #[error("collateral mismatch: reserve holds {expected}, collaborator uses {found}")]
    InvalidCollateral { expected: Address, found: Address },

    #[error("strategy reports {decimals} decimals, expected {expected}")]
    InvalidStrategyDecimals { decimals: u8, expected: u8 },

    #[error(transparent)]
    Params(#[from] ParamsError),

    // ── Business rules ───────────────────────────────────────────────────
    #[error("tranche {tranche} is not accepted for deposit (deposit bond: {deposit_bond:?})")]
    UnacceptableDepositTranche {
        tranche: Address,
        deposit_bond: Option<Address>,
    },

    #[error("unacceptable mint: {tranche_in_amt} tranches would mint {perp_amt_mint} perps")]
    UnacceptableMintAmt {
        tranche_in_amt: u128,
        perp_amt_mint: u128,
    },

    #[error("unacceptable burn of {perp_amt_burnt} perps against supply {total_supply}")]
    UnacceptableBurnAmt {
        perp_amt_burnt: u128,
        total_supply: u128,
    },

    #[error("burning {perp_amt_burnt} perps redeems nothing")]
    UnacceptableRedemption { perp_amt_burnt: u128 },

    #[error("rolling {tranche_in} in for {token_out} is not accepted")]
    UnacceptableRollover {
        tranche_in: Address,
        token_out: Address,
    },

    #[error("minted {minted} perps against tranche {tranche}, above the limit of {max}")]
    ExceededMaxMintPerTranche {
        tranche: Address,
        minted: u128,
        max: u128,
    },

    #[error("total supply {supply} exceeds the limit of {max}")]
    ExceededMaxSupply { supply: u128, max: u128 },

    #[error("reserve token {0} cannot be transferred out")]
    UnauthorizedTransferOut(Address),

    // ── State ────────────────────────────────────────────────────────────
    #[error("engine is paused")]
    Paused,

    #[error("engine is not paused")]
    NotPaused,

    #[error("reentrant call")]
    Reentrancy,

    // ── Arithmetic / collaborators ───────────────────────────────────────
    #[error("arithmetic overflow in reserve computation")]
    Overflow,

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("serialization error: {0}")]
    Serialization(String),
}
