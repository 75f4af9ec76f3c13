//! Shared unit-test fixture: an engine over nullable collaborators with one
//! open bond and two funded depositors.

use crate::{Collaborators, PerpEngine, PerpError, RolloverData};
use perp_interfaces::{BondIssuer, Clock, TokenLedger};
use perp_nullables::{NullBondIssuer, NullChain, NullFees, NullPricing};
use perp_types::{Address, PerpParams, Timestamp};

pub(crate) const START: u64 = 1_000;
pub(crate) const BOND_LIFETIME: u64 = 100_000;
const FUNDING: u128 = 5_000;

pub(crate) struct Fixture {
    pub chain: NullChain,
    pub engine: PerpEngine,
    pub issuer: NullBondIssuer,
    pub pricing: NullPricing,
    pub fees: NullFees,
    pub owner: Address,
    pub collateral: Address,
    pub bond: Address,
    /// Senior tranche of `bond`.
    pub senior: Address,
    pub junior: Address,
    latest: Address,
}

impl Fixture {
    /// `bond-1` (20/80 senior/junior) open for deposits; alice and bob each
    /// hold 1000 senior and 4000 junior tranches of it.
    pub fn new() -> Self {
        let mut chain = NullChain::new(START);
        let collateral = Address::new("ampl");
        let issuer = NullBondIssuer::new(collateral.clone());
        let pricing = NullPricing::new();
        let fees = NullFees::new();
        let owner = Address::new("owner");

        let engine = PerpEngine::new(
            Address::new("perp"),
            owner.clone(),
            collateral.clone(),
            PerpParams::default(),
            Collaborators {
                bond_issuer: Box::new(issuer.clone()),
                pricing_strategy: Box::new(pricing.clone()),
                fee_strategy: Box::new(fees.clone()),
            },
        )
        .unwrap();

        let bond = Address::new("bond-1");
        let tranches = open_bond(&mut chain, &issuer, &bond, Timestamp::new(START + BOND_LIFETIME));

        Self {
            chain,
            engine,
            issuer,
            pricing,
            fees,
            owner,
            collateral,
            latest: bond.clone(),
            bond,
            senior: tranches[0].clone(),
            junior: tranches[1].clone(),
        }
    }

    pub fn now(&self) -> u64 {
        self.chain.now().as_secs()
    }

    /// Deposit `amt` of `bond-1`'s senior tranche.
    pub fn deposit(&mut self, who: &str, amt: u128) -> Result<u128, PerpError> {
        let senior = self.senior.clone();
        self.engine
            .deposit(&mut self.chain, &Address::new(who), &senior, amt)
    }

    pub fn redeem(&mut self, who: &str, amt: u128) -> Result<Vec<(Address, u128)>, PerpError> {
        self.engine.redeem(&mut self.chain, &Address::new(who), amt)
    }

    /// Roll the latest bond's senior tranche in for `token_out`.
    pub fn rollover(
        &mut self,
        who: &str,
        token_out: &Address,
        tranche_in_amt: u128,
        token_out_amt_requested: u128,
    ) -> Result<RolloverData, PerpError> {
        let fresh = self.fresh_senior();
        self.engine.rollover(
            &mut self.chain,
            &Address::new(who),
            &fresh,
            token_out,
            tranche_in_amt,
            token_out_amt_requested,
        )
    }

    pub fn perp_balance(&self, who: &str) -> u128 {
        self.chain
            .balance_of(self.engine.address(), &Address::new(who))
    }

    /// `who`'s balance of `bond-1`'s senior tranche.
    pub fn tranche_balance(&self, who: &str) -> u128 {
        self.chain.balance_of(&self.senior, &Address::new(who))
    }

    pub fn collateral_balance(&self, who: &str) -> u128 {
        self.chain.balance_of(&self.collateral, &Address::new(who))
    }

    pub fn reserve_balance(&self, token: &Address) -> u128 {
        self.chain.balance_of(token, self.engine.address())
    }

    /// Credit collateral straight to the engine, as a matured sweep would.
    pub fn fund_reserve_collateral(&mut self, amt: u128) {
        let engine = self.engine.address().clone();
        self.chain.mint(&self.collateral, &engine, amt).unwrap();
    }

    /// Issue a new bond, funding alice and bob with its tranches. It becomes
    /// the deposit bond on the next call if the window accepts it.
    pub fn issue_bond(&mut self, name: &str, maturity: Timestamp) {
        let bond = Address::new(name);
        open_bond(&mut self.chain, &self.issuer, &bond, maturity);
        self.latest = bond;
    }

    /// Senior tranche of the most recently issued bond.
    pub fn fresh_senior(&self) -> Address {
        Address::new(format!("{}-0", self.latest.as_str()))
    }

    pub fn set_window(&mut self, min: u64, max: u64) {
        let owner = self.owner.clone();
        self.engine
            .update_tolerable_tranche_maturity(&owner, min, max)
            .unwrap();
    }
}

fn open_bond(
    chain: &mut NullChain,
    issuer: &NullBondIssuer,
    bond: &Address,
    maturity: Timestamp,
) -> Vec<Address> {
    let collateral = issuer.collateral_token();
    let tranches = chain.create_bond(bond.clone(), collateral.clone(), maturity, &[200, 800]);
    for who in ["alice", "bob"] {
        let who = Address::new(who);
        chain.mint(&collateral, &who, FUNDING).unwrap();
        chain.deposit_into_bond(bond, &who, FUNDING).unwrap();
    }
    issuer.issue(bond.clone());
    tranches
}
