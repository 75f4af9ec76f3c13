//! Persisted engine state.

use crate::reserve::ReserveSet;
use perp_types::{Address, PerpParams};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Everything the engine owns, and nothing it merely references.
///
/// Cloned at the start of each atomic call so a failed call can restore it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PerpState {
    pub reserves: ReserveSet,
    /// Perps minted against each reserve tranche. Cleared when the tranche
    /// leaves the reserve.
    pub minted_supply_per_tranche: BTreeMap<Address, u128>,
    /// The bond whose senior tranche is currently accepted for deposits.
    pub deposit_bond: Option<Address>,
    pub params: PerpParams,
    /// Callers allowed to roll over. Empty means anyone.
    pub authorized_rollers: BTreeSet<Address>,
    pub paused: bool,
    pub owner: Address,
    pub keeper: Address,
}

impl PerpState {
    pub fn new(collateral: Address, owner: Address, params: PerpParams) -> Self {
        Self {
            reserves: ReserveSet::new(collateral),
            minted_supply_per_tranche: BTreeMap::new(),
            deposit_bond: None,
            params,
            authorized_rollers: BTreeSet::new(),
            paused: false,
            keeper: owner.clone(),
            owner,
        }
    }

    pub fn minted_supply(&self, tranche: &Address) -> u128 {
        self.minted_supply_per_tranche
            .get(tranche)
            .copied()
            .unwrap_or(0)
    }

    pub fn is_authorized_roller(&self, caller: &Address) -> bool {
        self.authorized_rollers.is_empty() || self.authorized_rollers.contains(caller)
    }
}
