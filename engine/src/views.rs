//! Read paths. Each refreshes time-dependent state first, so answers never
//! reflect a deposit bond or tranche that has since expired.

use crate::engine::PerpEngine;
use crate::error::PerpError;
use perp_interfaces::Chain;
use perp_types::{mul_div, Address, Rounding, UNIT_PRICE};

impl PerpEngine {
    pub fn reserve_count<C: Chain>(&mut self, chain: &mut C) -> Result<usize, PerpError> {
        self.with_fresh_state(chain, |engine, _| Ok(engine.state.reserves.len()))
    }

    /// The reserve asset at `index`, or `None` past the end. Indices other
    /// than 0 are not stable across calls.
    pub fn reserve_at<C: Chain>(
        &mut self,
        chain: &mut C,
        index: usize,
    ) -> Result<Option<Address>, PerpError> {
        self.with_fresh_state(chain, |engine, _| {
            Ok(engine.state.reserves.at(index).cloned())
        })
    }

    pub fn in_reserve<C: Chain>(&mut self, chain: &mut C, token: &Address) -> Result<bool, PerpError> {
        self.with_fresh_state(chain, |engine, _| Ok(engine.state.reserves.contains(token)))
    }

    /// The engine's balance of `token`, or zero if it is not a reserve asset.
    pub fn reserve_token_balance<C: Chain>(
        &mut self,
        chain: &mut C,
        token: &Address,
    ) -> Result<u128, PerpError> {
        self.with_fresh_state(chain, |engine, chain| {
            if !engine.state.reserves.contains(token) {
                return Ok(0);
            }
            Ok(chain.balance_of(token, engine.address()))
        })
    }

    /// Value of the engine's `token` holdings in collateral units, or zero if
    /// it is not a reserve asset.
    pub fn reserve_token_value<C: Chain>(
        &mut self,
        chain: &mut C,
        token: &Address,
    ) -> Result<u128, PerpError> {
        self.with_fresh_state(chain, |engine, chain| {
            if !engine.state.reserves.contains(token) {
                return Ok(0);
            }
            engine.token_value(chain, token)
        })
    }

    pub fn reserve_value<C: Chain>(&mut self, chain: &mut C) -> Result<u128, PerpError> {
        self.with_fresh_state(chain, |engine, chain| engine.total_reserve_value(chain))
    }

    /// Reserve value per perp, scaled by `UNIT_PRICE`. A perp with no supply
    /// is worth one unit.
    pub fn avg_price<C: Chain>(&mut self, chain: &mut C) -> Result<u128, PerpError> {
        self.with_fresh_state(chain, |engine, chain| {
            let supply = engine.perp_supply(chain);
            if supply == 0 {
                return Ok(UNIT_PRICE);
            }
            let value = engine.total_reserve_value(chain)?;
            mul_div(value, UNIT_PRICE, supply, Rounding::Down).ok_or(PerpError::Overflow)
        })
    }

    pub fn deposit_bond<C: Chain>(&mut self, chain: &mut C) -> Result<Option<Address>, PerpError> {
        self.with_fresh_state(chain, |engine, _| Ok(engine.state.deposit_bond.clone()))
    }

    pub fn is_acceptable_for_deposit<C: Chain>(
        &mut self,
        chain: &mut C,
        tranche: &Address,
    ) -> Result<bool, PerpError> {
        self.with_fresh_state(chain, |engine, chain| engine.is_deposit_tranche(chain, tranche))
    }

    pub fn is_acceptable_rollover<C: Chain>(
        &mut self,
        chain: &mut C,
        tranche_in: &Address,
        token_out: &Address,
    ) -> Result<bool, PerpError> {
        self.with_fresh_state(chain, |engine, chain| {
            engine.is_acceptable_rollover_pair(chain, tranche_in, token_out)
        })
    }

    /// Reserve assets a roller may currently take out: the collateral when
    /// the engine holds any, and every tranche whose bond has left the
    /// tolerated maturity window.
    pub fn reserve_tranches_up_for_rollover<C: Chain>(
        &mut self,
        chain: &mut C,
    ) -> Result<Vec<Address>, PerpError> {
        self.with_fresh_state(chain, |engine, chain| {
            let mut out = Vec::new();
            let collateral = engine.collateral();
            if chain.balance_of(collateral, engine.address()) > 0 {
                out.push(collateral.clone());
            }
            for tranche in engine.state.reserves.iter().skip(1) {
                let bond = chain.parent_bond(tranche)?;
                if !engine.is_acceptable_bond(chain, &bond)? {
                    out.push(tranche.clone());
                }
            }
            Ok(out)
        })
    }

    pub fn minted_supply<C: Chain>(
        &mut self,
        chain: &mut C,
        tranche: &Address,
    ) -> Result<u128, PerpError> {
        self.with_fresh_state(chain, |engine, _| Ok(engine.state.minted_supply(tranche)))
    }

    /// Perp token supply.
    pub fn total_supply<C: Chain>(&mut self, chain: &mut C) -> Result<u128, PerpError> {
        self.with_fresh_state(chain, |engine, chain| Ok(engine.perp_supply(chain)))
    }
}
