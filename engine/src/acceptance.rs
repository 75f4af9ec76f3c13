//! Acceptance predicates for bonds, deposit tranches and rollover pairs.

use crate::engine::PerpEngine;
use crate::error::PerpError;
use perp_interfaces::{Chain, ChainError};
use perp_types::Address;

impl PerpEngine {
    /// A bond is acceptable when it is backed by the reserve's collateral and
    /// its time to maturity lies within the tolerated window.
    pub(crate) fn is_acceptable_bond<C: Chain>(
        &self,
        chain: &C,
        bond: &Address,
    ) -> Result<bool, PerpError> {
        if &chain.collateral_token(bond)? != self.collateral() {
            return Ok(false);
        }
        let seconds_to_maturity = chain.seconds_to_maturity(bond)?;
        Ok(self.state.params.is_tolerable_maturity(seconds_to_maturity))
    }

    /// Only the most senior tranche of the current deposit bond is accepted
    /// for minting.
    pub(crate) fn is_deposit_tranche<C: Chain>(
        &self,
        chain: &C,
        tranche: &Address,
    ) -> Result<bool, PerpError> {
        let deposit_bond = match &self.state.deposit_bond {
            Some(bond) => bond,
            None => return Ok(false),
        };
        let parent = match chain.parent_bond(tranche) {
            Ok(parent) => parent,
            Err(ChainError::UnknownTranche(_)) => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        if &parent != deposit_bond {
            return Ok(false);
        }
        Ok(&chain.senior_tranche(deposit_bond)? == tranche)
    }

    /// Rolling into the collateral only requires a depositable tranche.
    /// Rolling into a tranche additionally requires the outgoing tranche to be
    /// a stale reserve member: not depositable and from a bond that no longer
    /// passes the bond check.
    pub(crate) fn is_acceptable_rollover_pair<C: Chain>(
        &self,
        chain: &C,
        tranche_in: &Address,
        token_out: &Address,
    ) -> Result<bool, PerpError> {
        if !self.is_deposit_tranche(chain, tranche_in)? {
            return Ok(false);
        }
        if self.is_underlying(token_out) {
            return Ok(true);
        }
        if self.is_deposit_tranche(chain, token_out)? || !self.state.reserves.contains(token_out) {
            return Ok(false);
        }
        let bond_out = chain.parent_bond(token_out)?;
        Ok(!self.is_acceptable_bond(chain, &bond_out)?)
    }
}
