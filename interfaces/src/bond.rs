//! Tranche bond collaborators.

use crate::ChainError;
use perp_types::{Address, Timestamp};

/// Source of newly issued bonds.
pub trait BondIssuer {
    /// The collateral token every bond from this issuer is backed by.
    fn collateral_token(&self) -> Address;

    /// The most recently issued bond, if any.
    fn latest_bond(&self) -> Option<Address>;
}

/// Read and settlement access to tranche bonds.
///
/// Tranches are ordered by seniority: index 0 is the most senior.
pub trait BondController {
    /// The collateral token deposited into `bond`.
    fn collateral_token(&self, bond: &Address) -> Result<Address, ChainError>;

    fn maturity_date(&self, bond: &Address) -> Result<Timestamp, ChainError>;

    /// Whether maturity has been finalized on `bond`.
    fn is_mature(&self, bond: &Address) -> Result<bool, ChainError>;

    fn tranche_count(&self, bond: &Address) -> Result<usize, ChainError>;

    fn tranche_at(&self, bond: &Address, index: usize) -> Result<Address, ChainError>;

    /// The bond a tranche token was issued by.
    fn parent_bond(&self, tranche: &Address) -> Result<Address, ChainError>;

    /// Finalize maturity, making tranches redeemable for collateral.
    fn mature(&mut self, bond: &Address) -> Result<(), ChainError>;

    /// Burn `amount` of `tranche` held by `holder` and pay out its share of
    /// the bond's collateral to `holder`.
    fn redeem_mature(
        &mut self,
        bond: &Address,
        tranche: &Address,
        holder: &Address,
        amount: u128,
    ) -> Result<(), ChainError>;

    /// The most senior tranche of `bond`.
    fn senior_tranche(&self, bond: &Address) -> Result<Address, ChainError> {
        self.tranche_at(bond, 0)
    }
}
