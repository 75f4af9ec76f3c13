//! Core reserve engine: construction, the lazy state updater and the
//! reserve bookkeeping every operation funnels through.

use crate::error::PerpError;
use crate::events::PerpEvent;
use crate::guard::ReentrancyGuard;
use crate::state::PerpState;
use perp_interfaces::{BondIssuer, Chain, FeeStrategy, PricingStrategy};
use perp_types::{mul_div, Address, PerpParams, Rounding, PERC_DECIMALS, PRICE_DECIMALS, UNIT_PRICE};

/// The external strategies the engine consults. All three are replaceable by
/// the owner.
pub struct Collaborators {
    pub bond_issuer: Box<dyn BondIssuer>,
    pub pricing_strategy: Box<dyn PricingStrategy>,
    pub fee_strategy: Box<dyn FeeStrategy>,
}

/// The perpetual tranche reserve engine.
///
/// Holds the reserve on the ledger under its own `address`, which is also the
/// address of the perp token it mints and burns. Every public operation takes
/// the ledger (`Chain`) by mutable reference, brings time-dependent state
/// current with [`PerpEngine::update_state`] semantics, and either commits all
/// of its effects or none.
pub struct PerpEngine {
    address: Address,
    pub(crate) state: PerpState,
    pub(crate) bond_issuer: Box<dyn BondIssuer>,
    pub(crate) pricing_strategy: Box<dyn PricingStrategy>,
    pub(crate) fee_strategy: Box<dyn FeeStrategy>,
    pub(crate) guard: ReentrancyGuard,
    events: Vec<PerpEvent>,
}

impl PerpEngine {
    /// Create an engine backed by `collateral`, owned (and initially kept) by
    /// `owner`.
    pub fn new(
        address: Address,
        owner: Address,
        collateral: Address,
        params: PerpParams,
        collaborators: Collaborators,
    ) -> Result<Self, PerpError> {
        if address.is_zero() || owner.is_zero() || collateral.is_zero() {
            return Err(PerpError::UnacceptableReference);
        }
        params.validate()?;
        Self::from_state(address, PerpState::new(collateral, owner, params), collaborators)
    }

    /// Rebuild an engine from bytes produced by [`PerpEngine::export_state`].
    pub fn restore(
        address: Address,
        bytes: &[u8],
        collaborators: Collaborators,
    ) -> Result<Self, PerpError> {
        if address.is_zero() {
            return Err(PerpError::UnacceptableReference);
        }
        let state: PerpState =
            bincode::deserialize(bytes).map_err(|e| PerpError::Serialization(e.to_string()))?;
        state.params.validate()?;
        Self::from_state(address, state, collaborators)
    }

    fn from_state(
        address: Address,
        state: PerpState,
        collaborators: Collaborators,
    ) -> Result<Self, PerpError> {
        check_collateral(state.reserves.collateral(), &*collaborators.bond_issuer)?;
        check_decimals(collaborators.pricing_strategy.decimals(), PRICE_DECIMALS)?;
        check_decimals(collaborators.fee_strategy.decimals(), PERC_DECIMALS)?;
        Ok(Self {
            address,
            state,
            bond_issuer: collaborators.bond_issuer,
            pricing_strategy: collaborators.pricing_strategy,
            fee_strategy: collaborators.fee_strategy,
            guard: ReentrancyGuard::default(),
            events: Vec::new(),
        })
    }

    /// Serialize the persisted layout with bincode.
    pub fn export_state(&self) -> Result<Vec<u8>, PerpError> {
        bincode::serialize(&self.state).map_err(|e| PerpError::Serialization(e.to_string()))
    }

    /// The engine's ledger address, which is also the perp token's address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The underlying collateral token (reserve index 0).
    pub fn collateral(&self) -> &Address {
        self.state.reserves.collateral()
    }

    /// Current state as of the last call. Does not refresh.
    pub fn state(&self) -> &PerpState {
        &self.state
    }

    pub fn params(&self) -> &PerpParams {
        &self.state.params
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<PerpEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: PerpEvent) {
        self.events.push(event);
    }

    // ── Lazy state updater ───────────────────────────────────────────────

    /// Bring time-dependent state current: adopt the issuer's latest bond if
    /// it is acceptable, and sweep matured tranches into collateral.
    ///
    /// Idempotent: a second call against unchanged collaborators changes
    /// nothing.
    pub fn update_state<C: Chain>(&mut self, chain: &mut C) -> Result<(), PerpError> {
        let _entered = self.guard.enter()?;
        self.atomically(chain, |engine, chain| engine.refresh_state(chain))
    }

    pub(crate) fn refresh_state<C: Chain>(&mut self, chain: &mut C) -> Result<(), PerpError> {
        if let Some(latest) = self.bond_issuer.latest_bond() {
            if self.state.deposit_bond.as_ref() != Some(&latest)
                && self.is_acceptable_bond(chain, &latest)?
            {
                tracing::info!(bond = %latest, "updated deposit bond");
                self.state.deposit_bond = Some(latest.clone());
                self.emit(PerpEvent::UpdatedDepositBond { bond: latest });
            }
        }

        let collateral = self.collateral().clone();
        let collateral_before = chain.balance_of(&collateral, &self.address);

        // Walk backwards: removal swaps the last element into the vacated
        // slot, which a forward walk would skip.
        let now = chain.now();
        for index in (1..self.state.reserves.len()).rev() {
            let tranche = match self.state.reserves.at(index) {
                Some(tranche) => tranche.clone(),
                None => continue,
            };
            let bond = chain.parent_bond(&tranche)?;
            if !chain.maturity_date(&bond)?.has_passed(now) {
                continue;
            }
            if !chain.is_mature(&bond)? {
                chain.mature(&bond)?;
            }
            let balance = chain.balance_of(&tranche, &self.address);
            tracing::debug!(%tranche, %bond, balance, "redeeming matured tranche");
            chain.redeem_mature(&bond, &tranche, &self.address, balance)?;
            self.sync_reserve(chain, &tranche);
        }

        // Report the collateral only when the sweep moved it.
        let (balance, membership_changed) = self.sync_membership(chain, &collateral);
        if membership_changed || balance != collateral_before {
            self.emit(PerpEvent::ReserveSynced {
                token: collateral,
                balance,
            });
        }
        Ok(())
    }

    /// Run `op`, restoring engine state, ledger state and the event buffer if
    /// it fails.
    pub(crate) fn atomically<C, T, F>(&mut self, chain: &mut C, op: F) -> Result<T, PerpError>
    where
        C: Chain,
        F: FnOnce(&mut Self, &mut C) -> Result<T, PerpError>,
    {
        let state = self.state.clone();
        let snapshot = chain.checkpoint();
        let events = self.events.len();
        match op(self, chain) {
            Ok(value) => Ok(value),
            Err(e) => {
                self.state = state;
                chain.rollback(snapshot);
                self.events.truncate(events);
                Err(e)
            }
        }
    }

    /// Refresh, then evaluate a read-only query against the fresh state.
    pub(crate) fn with_fresh_state<C, T, F>(&mut self, chain: &mut C, query: F) -> Result<T, PerpError>
    where
        C: Chain,
        F: FnOnce(&Self, &C) -> Result<T, PerpError>,
    {
        let _entered = self.guard.enter()?;
        self.atomically(chain, |engine, chain| {
            engine.refresh_state(chain)?;
            query(&*engine, &*chain)
        })
    }

    // ── Reserve bookkeeping ──────────────────────────────────────────────

    /// Re-read the engine's balance of `token` after moving it, update
    /// reserve membership and report the new balance. Returns the balance.
    pub(crate) fn sync_reserve<C: Chain>(&mut self, chain: &C, token: &Address) -> u128 {
        let (balance, _) = self.sync_membership(chain, token);
        self.emit(PerpEvent::ReserveSynced {
            token: token.clone(),
            balance,
        });
        balance
    }

    /// Update reserve membership of `token` from its current balance.
    /// Returns the balance and whether membership changed.
    fn sync_membership<C: Chain>(&mut self, chain: &C, token: &Address) -> (u128, bool) {
        let balance = chain.balance_of(token, &self.address);
        let in_reserve = self.state.reserves.contains(token);
        if balance > 0 && !in_reserve {
            self.state.reserves.insert(token.clone());
            tracing::debug!(%token, balance, "added to reserve");
            (balance, true)
        } else if balance == 0 && in_reserve && !self.is_underlying(token) {
            self.state.reserves.remove(token);
            self.state.minted_supply_per_tranche.remove(token);
            tracing::debug!(%token, "removed from reserve");
            (balance, true)
        } else {
            (balance, false)
        }
    }

    pub(crate) fn transfer_into_reserve<C: Chain>(
        &mut self,
        chain: &mut C,
        from: &Address,
        token: &Address,
        amount: u128,
    ) -> Result<u128, PerpError> {
        chain.transfer(token, from, &self.address, amount)?;
        Ok(self.sync_reserve(chain, token))
    }

    pub(crate) fn transfer_out_of_reserve<C: Chain>(
        &mut self,
        chain: &mut C,
        token: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<u128, PerpError> {
        chain.transfer(token, &self.address, to, amount)?;
        Ok(self.sync_reserve(chain, token))
    }

    pub(crate) fn is_underlying(&self, token: &Address) -> bool {
        token == self.collateral()
    }

    // ── Valuation ────────────────────────────────────────────────────────

    /// Unit price of a reserve token; the collateral is always `UNIT_PRICE`.
    pub(crate) fn token_price(&self, token: &Address) -> u128 {
        if self.is_underlying(token) {
            UNIT_PRICE
        } else {
            self.pricing_strategy.compute_tranche_price(token)
        }
    }

    pub(crate) fn token_value<C: Chain>(&self, chain: &C, token: &Address) -> Result<u128, PerpError> {
        let balance = chain.balance_of(token, &self.address);
        if self.is_underlying(token) {
            return Ok(balance);
        }
        mul_div(balance, self.token_price(token), UNIT_PRICE, Rounding::Down).ok_or(PerpError::Overflow)
    }

    /// Sum of balance × price over the reserve, in collateral units.
    pub(crate) fn total_reserve_value<C: Chain>(&self, chain: &C) -> Result<u128, PerpError> {
        self.state.reserves.iter().try_fold(0u128, |total, token| {
            total
                .checked_add(self.token_value(chain, token)?)
                .ok_or(PerpError::Overflow)
        })
    }

    pub(crate) fn perp_supply<C: Chain>(&self, chain: &C) -> u128 {
        chain.total_supply(&self.address)
    }
}

pub(crate) fn check_decimals(decimals: u8, expected: u8) -> Result<(), PerpError> {
    if decimals != expected {
        return Err(PerpError::InvalidStrategyDecimals { decimals, expected });
    }
    Ok(())
}

pub(crate) fn check_collateral(expected: &Address, issuer: &dyn BondIssuer) -> Result<(), PerpError> {
    let found = issuer.collateral_token();
    if &found != expected {
        return Err(PerpError::InvalidCollateral {
            expected: expected.clone(),
            found,
        });
    }
    Ok(())
}
