//! Owner and keeper surface: collaborator swaps, limits, the roller
//! allowlist, pausing and recovery of stray tokens.

use crate::engine::{check_collateral, check_decimals, PerpEngine};
use crate::error::PerpError;
use crate::events::PerpEvent;
use perp_interfaces::{BondIssuer, Chain, FeeStrategy, PricingStrategy};
use perp_types::{Address, PerpParams, PERC_DECIMALS, PRICE_DECIMALS};

impl PerpEngine {
    pub(crate) fn ensure_not_paused(&self) -> Result<(), PerpError> {
        if self.state.paused {
            return Err(PerpError::Paused);
        }
        Ok(())
    }

    fn ensure_owner(&self, caller: &Address) -> Result<(), PerpError> {
        if caller != &self.state.owner {
            return Err(PerpError::UnauthorizedCall(caller.clone()));
        }
        Ok(())
    }

    fn ensure_keeper(&self, caller: &Address) -> Result<(), PerpError> {
        if caller != &self.state.keeper {
            return Err(PerpError::UnauthorizedCall(caller.clone()));
        }
        Ok(())
    }

    // ── Owner ────────────────────────────────────────────────────────────

    pub fn transfer_ownership(&mut self, caller: &Address, owner: Address) -> Result<(), PerpError> {
        self.ensure_owner(caller)?;
        if owner.is_zero() {
            return Err(PerpError::UnacceptableReference);
        }
        let previous = std::mem::replace(&mut self.state.owner, owner.clone());
        tracing::info!(%previous, %owner, "ownership transferred");
        self.emit(PerpEvent::UpdatedOwner { previous, owner });
        Ok(())
    }

    pub fn update_keeper(&mut self, caller: &Address, keeper: Address) -> Result<(), PerpError> {
        self.ensure_owner(caller)?;
        let previous = std::mem::replace(&mut self.state.keeper, keeper.clone());
        tracing::info!(%previous, %keeper, "keeper updated");
        self.emit(PerpEvent::UpdatedKeeper { previous, keeper });
        Ok(())
    }

    /// Replace the bond issuer. The new issuer must issue bonds backed by the
    /// reserve's collateral.
    pub fn update_bond_issuer(
        &mut self,
        caller: &Address,
        bond_issuer: Box<dyn BondIssuer>,
    ) -> Result<(), PerpError> {
        self.ensure_owner(caller)?;
        check_collateral(self.collateral(), &*bond_issuer)?;
        self.bond_issuer = bond_issuer;
        self.emit(PerpEvent::UpdatedBondIssuer);
        Ok(())
    }

    pub fn update_pricing_strategy(
        &mut self,
        caller: &Address,
        pricing_strategy: Box<dyn PricingStrategy>,
    ) -> Result<(), PerpError> {
        self.ensure_owner(caller)?;
        check_decimals(pricing_strategy.decimals(), PRICE_DECIMALS)?;
        self.pricing_strategy = pricing_strategy;
        self.emit(PerpEvent::UpdatedPricingStrategy);
        Ok(())
    }

    pub fn update_fee_strategy(
        &mut self,
        caller: &Address,
        fee_strategy: Box<dyn FeeStrategy>,
    ) -> Result<(), PerpError> {
        self.ensure_owner(caller)?;
        check_decimals(fee_strategy.decimals(), PERC_DECIMALS)?;
        self.fee_strategy = fee_strategy;
        self.emit(PerpEvent::UpdatedFeeStrategy);
        Ok(())
    }

    /// Set the `[min, max)` window of seconds-to-maturity a bond must fall in
    /// to be accepted.
    pub fn update_tolerable_tranche_maturity(
        &mut self,
        caller: &Address,
        min: u64,
        max: u64,
    ) -> Result<(), PerpError> {
        self.ensure_owner(caller)?;
        let params = PerpParams {
            min_tranche_maturity_secs: min,
            max_tranche_maturity_secs: max,
            ..self.state.params.clone()
        };
        params.validate()?;
        self.state.params = params;
        self.emit(PerpEvent::UpdatedTolerableTrancheMaturity { min, max });
        Ok(())
    }

    /// Caps only constrain future deposits; lowering them below current
    /// levels does not affect existing supply.
    pub fn update_minting_limits(
        &mut self,
        caller: &Address,
        max_supply: u128,
        max_mint_amt_per_tranche: u128,
    ) -> Result<(), PerpError> {
        self.ensure_owner(caller)?;
        self.state.params.max_supply = max_supply;
        self.state.params.max_mint_amt_per_tranche = max_mint_amt_per_tranche;
        self.emit(PerpEvent::UpdatedMintingLimits {
            max_supply,
            max_mint_amt_per_tranche,
        });
        Ok(())
    }

    /// Add or remove `roller` from the allowlist. Removing the last entry
    /// opens rollovers to everyone again.
    pub fn authorize_roller(
        &mut self,
        caller: &Address,
        roller: Address,
        authorized: bool,
    ) -> Result<(), PerpError> {
        self.ensure_owner(caller)?;
        let changed = if authorized {
            self.state.authorized_rollers.insert(roller.clone())
        } else {
            self.state.authorized_rollers.remove(&roller)
        };
        if changed {
            self.emit(PerpEvent::AuthorizedRoller { roller, authorized });
        }
        Ok(())
    }

    /// Recover a token sent to the engine by mistake. Reserve assets cannot
    /// be moved this way.
    pub fn transfer_out<C: Chain>(
        &mut self,
        chain: &mut C,
        caller: &Address,
        token: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), PerpError> {
        let _entered = self.guard.enter()?;
        self.ensure_owner(caller)?;
        self.atomically(chain, |engine, chain| {
            engine.refresh_state(chain)?;
            if engine.state.reserves.contains(token) {
                return Err(PerpError::UnauthorizedTransferOut(token.clone()));
            }
            chain.transfer(token, engine.address(), to, amount)?;
            tracing::info!(%token, %to, amount, "transferred out");
            Ok(())
        })
    }

    // ── Keeper ───────────────────────────────────────────────────────────

    pub fn pause(&mut self, caller: &Address) -> Result<(), PerpError> {
        self.ensure_keeper(caller)?;
        self.ensure_not_paused()?;
        self.state.paused = true;
        tracing::warn!(by = %caller, "paused");
        self.emit(PerpEvent::Paused { by: caller.clone() });
        Ok(())
    }

    pub fn unpause(&mut self, caller: &Address) -> Result<(), PerpError> {
        self.ensure_keeper(caller)?;
        if !self.state.paused {
            return Err(PerpError::NotPaused);
        }
        self.state.paused = false;
        tracing::info!(by = %caller, "unpaused");
        self.emit(PerpEvent::Unpaused { by: caller.clone() });
        Ok(())
    }
}
