//! Nullable chain: in-memory token ledger and tranche bonds.

use crate::clock::NullClock;
use perp_interfaces::{BondController, ChainError, Checkpoint, Clock, TokenLedger};
use perp_types::{mul_div, Address, Rounding, Timestamp, UNIT_PRICE};
use std::collections::HashMap;

/// Tranche ratios are expressed in parts per thousand of deposited collateral.
pub const TRANCHE_RATIO_GRANULARITY: u128 = 1_000;

/// An in-memory tranche bond.
#[derive(Clone, Debug)]
pub struct NullBond {
    pub collateral: Address,
    pub maturity: Timestamp,
    /// Tranche tokens, most senior first.
    pub tranches: Vec<Address>,
    /// Parts per thousand of deposited collateral minted as each tranche.
    pub ratios: Vec<u128>,
    pub mature: bool,
    /// Collateral paid per tranche token at redemption, `UNIT_PRICE` = 1:1.
    pub payouts: HashMap<Address, u128>,
}

#[derive(Clone, Debug, Default)]
pub struct ChainState {
    balances: HashMap<(Address, Address), u128>,
    supplies: HashMap<Address, u128>,
    bonds: HashMap<Address, NullBond>,
    tranche_bonds: HashMap<Address, Address>,
}

/// A deterministic, in-memory ledger implementing every chain-side trait the
/// engine consumes.
///
/// Snapshots cover balances and bonds. The clock is not rolled back.
#[derive(Debug, Default)]
pub struct NullChain {
    state: ChainState,
    clock: NullClock,
}

impl NullChain {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            state: ChainState::default(),
            clock: NullClock::new(initial_secs),
        }
    }

    pub fn clock(&self) -> &NullClock {
        &self.clock
    }

    /// Register a bond whose tranches are named `<bond>-<index>`.
    /// Returns the tranche addresses, most senior first.
    pub fn create_bond(
        &mut self,
        bond: impl Into<Address>,
        collateral: impl Into<Address>,
        maturity: Timestamp,
        ratios: &[u128],
    ) -> Vec<Address> {
        let bond = bond.into();
        let tranches: Vec<Address> = (0..ratios.len())
            .map(|i| Address::new(format!("{}-{}", bond.as_str(), i)))
            .collect();
        for tranche in &tranches {
            self.state
                .tranche_bonds
                .insert(tranche.clone(), bond.clone());
        }
        self.state.bonds.insert(
            bond,
            NullBond {
                collateral: collateral.into(),
                maturity,
                tranches: tranches.clone(),
                ratios: ratios.to_vec(),
                mature: false,
                payouts: HashMap::new(),
            },
        );
        tranches
    }

    /// Deposit collateral into a bond and mint its tranches to `depositor`
    /// according to the bond's ratios. Returns the minted tranche amounts.
    pub fn deposit_into_bond(
        &mut self,
        bond: &Address,
        depositor: &Address,
        collateral_amount: u128,
    ) -> Result<Vec<u128>, ChainError> {
        let info = self.bond(bond)?.clone();
        self.transfer(&info.collateral, depositor, bond, collateral_amount)?;
        let mut minted = Vec::with_capacity(info.tranches.len());
        for (tranche, ratio) in info.tranches.iter().zip(&info.ratios) {
            let amount = mul_div(
                collateral_amount,
                *ratio,
                TRANCHE_RATIO_GRANULARITY,
                Rounding::Down,
            )
            .ok_or(ChainError::Overflow)?;
            self.mint(tranche, depositor, amount)?;
            minted.push(amount);
        }
        Ok(minted)
    }

    /// Override the collateral paid per tranche token at redemption.
    pub fn set_payout(&mut self, tranche: &Address, payout: u128) -> Result<(), ChainError> {
        let bond = self.parent_bond(tranche)?;
        self.bond_mut(&bond)?.payouts.insert(tranche.clone(), payout);
        Ok(())
    }

    pub fn bond(&self, bond: &Address) -> Result<&NullBond, ChainError> {
        self.state
            .bonds
            .get(bond)
            .ok_or_else(|| ChainError::UnknownBond(bond.clone()))
    }

    fn bond_mut(&mut self, bond: &Address) -> Result<&mut NullBond, ChainError> {
        self.state
            .bonds
            .get_mut(bond)
            .ok_or_else(|| ChainError::UnknownBond(bond.clone()))
    }

    fn credit(&mut self, token: &Address, holder: &Address, amount: u128) -> Result<(), ChainError> {
        let balance = self
            .state
            .balances
            .entry((token.clone(), holder.clone()))
            .or_insert(0);
        *balance = balance.checked_add(amount).ok_or(ChainError::Overflow)?;
        Ok(())
    }

    fn debit(&mut self, token: &Address, holder: &Address, amount: u128) -> Result<(), ChainError> {
        let available = self.balance_of(token, holder);
        if available < amount {
            return Err(ChainError::InsufficientBalance {
                token: token.clone(),
                holder: holder.clone(),
                needed: amount,
                available,
            });
        }
        let key = (token.clone(), holder.clone());
        if available == amount {
            self.state.balances.remove(&key);
        } else {
            self.state.balances.insert(key, available - amount);
        }
        Ok(())
    }
}

impl TokenLedger for NullChain {
    fn balance_of(&self, token: &Address, holder: &Address) -> u128 {
        self.state
            .balances
            .get(&(token.clone(), holder.clone()))
            .copied()
            .unwrap_or(0)
    }

    fn total_supply(&self, token: &Address) -> u128 {
        self.state.supplies.get(token).copied().unwrap_or(0)
    }

    fn transfer(
        &mut self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), ChainError> {
        self.debit(token, from, amount)?;
        self.credit(token, to, amount)
    }

    fn mint(&mut self, token: &Address, to: &Address, amount: u128) -> Result<(), ChainError> {
        let supply = self.state.supplies.entry(token.clone()).or_insert(0);
        *supply = supply.checked_add(amount).ok_or(ChainError::Overflow)?;
        self.credit(token, to, amount)
    }

    fn burn(&mut self, token: &Address, from: &Address, amount: u128) -> Result<(), ChainError> {
        self.debit(token, from, amount)?;
        let supply = self.state.supplies.entry(token.clone()).or_insert(0);
        *supply = supply.saturating_sub(amount);
        Ok(())
    }
}

impl BondController for NullChain {
    fn collateral_token(&self, bond: &Address) -> Result<Address, ChainError> {
        Ok(self.bond(bond)?.collateral.clone())
    }

    fn maturity_date(&self, bond: &Address) -> Result<Timestamp, ChainError> {
        Ok(self.bond(bond)?.maturity)
    }

    fn is_mature(&self, bond: &Address) -> Result<bool, ChainError> {
        Ok(self.bond(bond)?.mature)
    }

    fn tranche_count(&self, bond: &Address) -> Result<usize, ChainError> {
        Ok(self.bond(bond)?.tranches.len())
    }

    fn tranche_at(&self, bond: &Address, index: usize) -> Result<Address, ChainError> {
        self.bond(bond)?
            .tranches
            .get(index)
            .cloned()
            .ok_or_else(|| ChainError::TrancheIndexOutOfRange {
                bond: bond.clone(),
                index,
            })
    }

    fn parent_bond(&self, tranche: &Address) -> Result<Address, ChainError> {
        self.state
            .tranche_bonds
            .get(tranche)
            .cloned()
            .ok_or_else(|| ChainError::UnknownTranche(tranche.clone()))
    }

    fn mature(&mut self, bond: &Address) -> Result<(), ChainError> {
        let now = self.clock.now();
        let info = self.bond_mut(bond)?;
        if info.mature {
            return Err(ChainError::BondAlreadyMature(bond.clone()));
        }
        if !info.maturity.has_passed(now) {
            return Err(ChainError::BondNotMature(bond.clone()));
        }
        info.mature = true;
        Ok(())
    }

    fn redeem_mature(
        &mut self,
        bond: &Address,
        tranche: &Address,
        holder: &Address,
        amount: u128,
    ) -> Result<(), ChainError> {
        let info = self.bond(bond)?;
        if !info.mature {
            return Err(ChainError::BondNotMature(bond.clone()));
        }
        if !info.tranches.contains(tranche) {
            return Err(ChainError::UnknownTranche(tranche.clone()));
        }
        let collateral = info.collateral.clone();
        let payout = info.payouts.get(tranche).copied().unwrap_or(UNIT_PRICE);
        let collateral_out =
            mul_div(amount, payout, UNIT_PRICE, Rounding::Down).ok_or(ChainError::Overflow)?;

        self.burn(tranche, holder, amount)?;
        if collateral_out > 0 {
            self.transfer(&collateral, bond, holder, collateral_out)?;
        }
        Ok(())
    }
}

impl Clock for NullChain {
    fn now(&self) -> Timestamp {
        self.clock.now()
    }
}

impl Checkpoint for NullChain {
    type Snapshot = ChainState;

    fn checkpoint(&self) -> ChainState {
        self.state.clone()
    }

    fn rollback(&mut self, snapshot: ChainState) {
        self.state = snapshot;
    }
}
