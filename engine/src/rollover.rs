//! Rollover engine: swap a fresh deposit tranche into the reserve for a
//! stale reserve asset at a fee-adjusted, value-equivalent rate.

use crate::engine::PerpEngine;
use crate::error::PerpError;
use perp_interfaces::Chain;
use perp_types::{mul_div, Address, Rounding, RolloverFee};
use serde::{Deserialize, Serialize};

/// Amounts exchanged by a rollover.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloverData {
    /// Tranche tokens taken from the roller.
    pub tranche_in_amt: u128,
    /// Reserve tokens paid to the roller.
    pub token_out_amt: u128,
}

impl RolloverData {
    /// Nothing exchanged.
    pub const NULL: Self = Self {
        tranche_in_amt: 0,
        token_out_amt: 0,
    };

    pub fn is_null(&self) -> bool {
        self.tranche_in_amt == 0 || self.token_out_amt == 0
    }

    /// Collapse a one-sided exchange to [`RolloverData::NULL`].
    fn or_null(self) -> Self {
        if self.is_null() {
            Self::NULL
        } else {
            self
        }
    }
}

impl PerpEngine {
    /// Roll `tranche_in` into the reserve in exchange for `token_out`.
    ///
    /// `tranche_in_amt_available` bounds what the roller offers and
    /// `token_out_amt_requested` bounds what they want back (`u128::MAX` for
    /// the whole reserve balance). Degenerate inputs yield
    /// [`RolloverData::NULL`] and move nothing.
    pub fn rollover<C: Chain>(
        &mut self,
        chain: &mut C,
        caller: &Address,
        tranche_in: &Address,
        token_out: &Address,
        tranche_in_amt_available: u128,
        token_out_amt_requested: u128,
    ) -> Result<RolloverData, PerpError> {
        let _entered = self.guard.enter()?;
        self.ensure_not_paused()?;
        if !self.state.is_authorized_roller(caller) {
            return Err(PerpError::UnauthorizedCall(caller.clone()));
        }
        self.atomically(chain, |engine, chain| {
            engine.refresh_state(chain)?;
            if !engine.is_acceptable_rollover_pair(chain, tranche_in, token_out)? {
                return Err(PerpError::UnacceptableRollover {
                    tranche_in: tranche_in.clone(),
                    token_out: token_out.clone(),
                });
            }

            let r = engine.rollover_amt_for(
                chain,
                tranche_in,
                token_out,
                tranche_in_amt_available,
                token_out_amt_requested,
            )?;
            if r.is_null() {
                return Ok(RolloverData::NULL);
            }

            engine.transfer_into_reserve(chain, caller, tranche_in, r.tranche_in_amt)?;
            engine.transfer_out_of_reserve(chain, token_out, caller, r.token_out_amt)?;

            tracing::info!(
                %caller,
                %tranche_in,
                %token_out,
                tranche_in_amt = r.tranche_in_amt,
                token_out_amt = r.token_out_amt,
                "rollover"
            );
            Ok(r)
        })
    }

    /// Preview a rollover. Never rejects degenerate inputs, so it doubles as
    /// a dry run.
    pub fn compute_rollover_amt<C: Chain>(
        &mut self,
        chain: &mut C,
        tranche_in: &Address,
        token_out: &Address,
        tranche_in_amt_available: u128,
        token_out_amt_requested: u128,
    ) -> Result<RolloverData, PerpError> {
        self.with_fresh_state(chain, |engine, chain| {
            engine.rollover_amt_for(
                chain,
                tranche_in,
                token_out,
                tranche_in_amt_available,
                token_out_amt_requested,
            )
        })
    }

    fn rollover_amt_for<C: Chain>(
        &self,
        chain: &C,
        tranche_in: &Address,
        token_out: &Address,
        tranche_in_amt_available: u128,
        token_out_amt_requested: u128,
    ) -> Result<RolloverData, PerpError> {
        let fee = RolloverFee::from_perc(self.fee_strategy.compute_rollover_fee_perc())?;
        let tranche_in_price = self.token_price(tranche_in);
        let token_out_price = self.token_price(token_out);
        let token_out_balance = chain.balance_of(token_out, self.address());
        let token_out_amt_requested = token_out_amt_requested.min(token_out_balance);

        if tranche_in_amt_available == 0
            || tranche_in_price == 0
            || token_out_price == 0
            || token_out_amt_requested == 0
        {
            return Ok(RolloverData::NULL);
        }

        let token_out_amt = mul_div(
            tranche_in_amt_available,
            tranche_in_price,
            token_out_price,
            Rounding::Down,
        )
        .and_then(|amt| fee.apply_to_outgoing(amt))
        .ok_or(PerpError::Overflow)?;

        if token_out_amt <= token_out_amt_requested {
            return Ok(RolloverData {
                tranche_in_amt: tranche_in_amt_available,
                token_out_amt,
            }
            .or_null());
        }

        // Outgoing side is the binding constraint: fix it and solve for the
        // incoming side, rounding against the roller at each step.
        let tranche_in_amt = mul_div(
            token_out_amt_requested,
            token_out_price,
            tranche_in_price,
            Rounding::Up,
        )
        .and_then(|amt| fee.gross_up_incoming(amt))
        .ok_or(PerpError::Overflow)?;

        Ok(RolloverData {
            tranche_in_amt,
            token_out_amt: token_out_amt_requested,
        }
        .or_null())
    }
}
