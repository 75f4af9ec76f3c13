//! Mint engine: deposit a senior tranche, receive perps.

use crate::engine::PerpEngine;
use crate::error::PerpError;
use perp_interfaces::Chain;
use perp_types::{mul_div, Address, ParamsError, Rounding, HUNDRED_PERC, UNIT_PRICE};

impl PerpEngine {
    /// Deposit `tranche_in_amt` of `tranche_in` from `caller` and mint perps
    /// to `caller`. Returns the minted amount.
    ///
    /// Issuance is share-proportional: a deposit worth X% of the reserve
    /// mints X% of the existing supply, less the mint fee. The per-tranche
    /// and total supply caps are checked after minting; exceeding either
    /// undoes the whole deposit.
    pub fn deposit<C: Chain>(
        &mut self,
        chain: &mut C,
        caller: &Address,
        tranche_in: &Address,
        tranche_in_amt: u128,
    ) -> Result<u128, PerpError> {
        let _entered = self.guard.enter()?;
        self.ensure_not_paused()?;
        self.atomically(chain, |engine, chain| {
            engine.refresh_state(chain)?;
            engine.ensure_deposit_tranche(chain, tranche_in)?;

            let perp_amt_mint = if tranche_in_amt == 0 {
                0
            } else {
                engine.mint_amt_for(chain, tranche_in, tranche_in_amt)?
            };
            if perp_amt_mint == 0 {
                return Err(PerpError::UnacceptableMintAmt {
                    tranche_in_amt,
                    perp_amt_mint,
                });
            }

            engine.transfer_into_reserve(chain, caller, tranche_in, tranche_in_amt)?;
            chain.mint(engine.address(), caller, perp_amt_mint)?;

            let minted = engine
                .state
                .minted_supply(tranche_in)
                .checked_add(perp_amt_mint)
                .ok_or(PerpError::Overflow)?;
            engine
                .state
                .minted_supply_per_tranche
                .insert(tranche_in.clone(), minted);

            engine.enforce_per_tranche_supply_cap(tranche_in)?;
            engine.enforce_total_supply_cap(chain)?;

            tracing::info!(
                %caller,
                %tranche_in,
                tranche_in_amt,
                perp_amt_mint,
                "deposit"
            );
            Ok(perp_amt_mint)
        })
    }

    /// Preview the perps a deposit would mint, without moving tokens.
    pub fn compute_mint_amt<C: Chain>(
        &mut self,
        chain: &mut C,
        tranche_in: &Address,
        tranche_in_amt: u128,
    ) -> Result<u128, PerpError> {
        self.with_fresh_state(chain, |engine, chain| {
            engine.ensure_deposit_tranche(chain, tranche_in)?;
            if tranche_in_amt == 0 {
                return Ok(0);
            }
            engine.mint_amt_for(chain, tranche_in, tranche_in_amt)
        })
    }

    fn ensure_deposit_tranche<C: Chain>(&self, chain: &C, tranche_in: &Address) -> Result<(), PerpError> {
        if !self.is_deposit_tranche(chain, tranche_in)? {
            return Err(PerpError::UnacceptableDepositTranche {
                tranche: tranche_in.clone(),
                deposit_bond: self.state.deposit_bond.clone(),
            });
        }
        Ok(())
    }

    /// `amt × price / UNIT_PRICE`, rescaled by `supply / reserve value` once
    /// supply exists, then reduced by the mint fee. Rounds down throughout.
    fn mint_amt_for<C: Chain>(
        &self,
        chain: &C,
        tranche_in: &Address,
        tranche_in_amt: u128,
    ) -> Result<u128, PerpError> {
        let fee_perc = self.fee_strategy.compute_mint_fee_perc();
        if fee_perc > HUNDRED_PERC {
            return Err(ParamsError::FeeOutOfRange {
                perc: fee_perc as i128,
            }
            .into());
        }

        let price = self.token_price(tranche_in);
        let mut perp_amt_mint =
            mul_div(tranche_in_amt, price, UNIT_PRICE, Rounding::Down).ok_or(PerpError::Overflow)?;

        let supply = self.perp_supply(chain);
        if supply > 0 {
            let reserve_value = self.total_reserve_value(chain)?;
            perp_amt_mint = if reserve_value == 0 {
                0
            } else {
                mul_div(perp_amt_mint, supply, reserve_value, Rounding::Down)
                    .ok_or(PerpError::Overflow)?
            };
        }

        mul_div(perp_amt_mint, HUNDRED_PERC - fee_perc, HUNDRED_PERC, Rounding::Down)
            .ok_or(PerpError::Overflow)
    }

    fn enforce_per_tranche_supply_cap(&self, tranche: &Address) -> Result<(), PerpError> {
        let minted = self.state.minted_supply(tranche);
        let max = self.state.params.max_mint_amt_per_tranche;
        if minted > max {
            tracing::warn!(%tranche, minted, max, "per-tranche mint cap exceeded");
            return Err(PerpError::ExceededMaxMintPerTranche {
                tranche: tranche.clone(),
                minted,
                max,
            });
        }
        Ok(())
    }

    fn enforce_total_supply_cap<C: Chain>(&self, chain: &C) -> Result<(), PerpError> {
        let supply = self.perp_supply(chain);
        let max = self.state.params.max_supply;
        if supply > max {
            tracing::warn!(supply, max, "total supply cap exceeded");
            return Err(PerpError::ExceededMaxSupply { supply, max });
        }
        Ok(())
    }
}
