//! Events emitted by the engine.
//!
//! Buffered in the engine and handed out with `PerpEngine::drain_events`.
//! Events emitted by a call that is rolled back are discarded with it.

use perp_types::Address;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerpEvent {
    /// A reserve asset's balance was re-read after a token movement.
    ReserveSynced { token: Address, balance: u128 },
    UpdatedDepositBond { bond: Address },
    UpdatedKeeper { previous: Address, keeper: Address },
    UpdatedOwner { previous: Address, owner: Address },
    UpdatedBondIssuer,
    UpdatedFeeStrategy,
    UpdatedPricingStrategy,
    UpdatedTolerableTrancheMaturity { min: u64, max: u64 },
    UpdatedMintingLimits { max_supply: u128, max_mint_amt_per_tranche: u128 },
    AuthorizedRoller { roller: Address, authorized: bool },
    Paused { by: Address },
    Unpaused { by: Address },
}
