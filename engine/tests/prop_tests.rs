use proptest::prelude::*;

use perp_engine::{Collaborators, PerpEngine, PerpError};
use perp_interfaces::{Clock, TokenLedger};
use perp_nullables::{NullBondIssuer, NullChain, NullFees, NullPricing};
use perp_types::{Address, PerpParams, Timestamp, UNIT_PERC, UNIT_PRICE};

const START: u64 = 1_000;
const LIFETIME: u64 = 100_000;
const FUNDING: u128 = 1_000_000_000;

fn addr(s: &str) -> Address {
    Address::new(s)
}

struct Harness {
    chain: NullChain,
    engine: PerpEngine,
    issuer: NullBondIssuer,
    pricing: NullPricing,
    fees: NullFees,
}

fn harness(params: PerpParams) -> Harness {
    let issuer = NullBondIssuer::new("ampl");
    let pricing = NullPricing::new();
    let fees = NullFees::new();
    let engine = PerpEngine::new(
        addr("perp"),
        addr("owner"),
        addr("ampl"),
        params,
        Collaborators {
            bond_issuer: Box::new(issuer.clone()),
            pricing_strategy: Box::new(pricing.clone()),
            fee_strategy: Box::new(fees.clone()),
        },
    )
    .unwrap();
    Harness {
        chain: NullChain::new(START),
        engine,
        issuer,
        pricing,
        fees,
    }
}

impl Harness {
    /// Single-tranche bond funding both alice and bob.
    fn issue(&mut self, name: &str, maturity: u64) -> Address {
        let tranches =
            self.chain
                .create_bond(name, "ampl", Timestamp::new(maturity), &[1_000]);
        for who in ["alice", "bob"] {
            self.chain.mint(&addr("ampl"), &addr(who), FUNDING).unwrap();
            self.chain
                .deposit_into_bond(&addr(name), &addr(who), FUNDING)
                .unwrap();
        }
        self.issuer.issue(name);
        tranches[0].clone()
    }

    /// Like `issue`, with the tranche priced at `price` and paying out the
    /// same amount of collateral per unit at maturity.
    fn issue_priced(&mut self, name: &str, maturity: u64, price: u128) -> Address {
        let tranche = self.issue(name, maturity);
        self.pricing.set_price(tranche.clone(), price);
        self.chain.set_payout(&tranche, price).unwrap();
        tranche
    }

    fn reserve_value_at_face(&self) -> u128 {
        self.engine
            .state()
            .reserves
            .iter()
            .map(|token| self.chain.balance_of(token, self.engine.address()))
            .sum()
    }

    fn supply(&self) -> u128 {
        self.chain.total_supply(self.engine.address())
    }

    fn membership_holds(&self) -> bool {
        let reserves = &self.engine.state().reserves;
        let listed = reserves.iter().skip(1).all(|token| {
            self.chain.balance_of(token, self.engine.address()) > 0
        });
        let first = reserves.at(0) == Some(&addr("ampl"));
        listed && first
    }
}

#[derive(Debug, Clone)]
enum Op {
    Deposit(u128),
    Redeem(u128),
    Rollover(u128),
    Advance(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u128..10_000).prop_map(Op::Deposit),
        (1u128..10_000).prop_map(Op::Redeem),
        (1u128..10_000).prop_map(Op::Rollover),
        (1u64..LIFETIME).prop_map(Op::Advance),
    ]
}

proptest! {
    /// At zero fees, every operation keeps the price-weighted reserve worth
    /// at least the outstanding supply at the opening average price. Prices
    /// are whole multiples of `UNIT_PRICE` so valuations carry no rounding.
    #[test]
    fn reserve_backs_supply_at_zero_fees(
        prices in prop::collection::vec(1u128..=4, 1..8),
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        let mut h = harness(PerpParams::default());
        let initial_avg = h.engine.avg_price(&mut h.chain).unwrap();
        prop_assert_eq!(initial_avg, UNIT_PRICE);

        let mut bonds = 0usize;
        let mut tranche = h.issue_priced("bond-0", START + LIFETIME, prices[0] * UNIT_PRICE);

        for op in ops {
            let result = match op {
                Op::Deposit(amt) => h
                    .engine
                    .deposit(&mut h.chain, &addr("alice"), &tranche, amt)
                    .map(|_| ()),
                Op::Redeem(amt) => {
                    let amt = amt.min(h.chain.balance_of(h.engine.address(), &addr("alice")));
                    h.engine.redeem(&mut h.chain, &addr("alice"), amt).map(|_| ())
                }
                Op::Rollover(amt) => {
                    let ampl = addr("ampl");
                    h.engine
                        .rollover(&mut h.chain, &addr("bob"), &tranche, &ampl, amt, u128::MAX)
                        .map(|_| ())
                }
                Op::Advance(secs) => {
                    h.chain.clock().advance(secs);
                    bonds += 1;
                    let now = h.chain.now().as_secs();
                    let price = prices[bonds % prices.len()] * UNIT_PRICE;
                    tranche = h.issue_priced(&format!("bond-{}", bonds), now + LIFETIME, price);
                    Ok(())
                }
            };
            let _ = result;
            prop_assert!(h.membership_holds());

            let value = h.engine.reserve_value(&mut h.chain).unwrap();
            let supply = h.supply();
            prop_assert!(
                value * UNIT_PRICE >= supply * initial_avg,
                "reserve value {} < supply {}",
                value,
                supply
            );
            prop_assert!(h.engine.avg_price(&mut h.chain).unwrap() >= initial_avg);
        }
    }

    /// The inverse branch never hands the roller more value than it takes,
    /// whatever the prices and the signed fee.
    #[test]
    fn rollover_never_favors_roller(
        collateral in 1u128..10_000,
        amount_in in 1u128..100_000,
        price_in in (UNIT_PRICE / 100)..(4 * UNIT_PRICE),
        fee in -(5 * UNIT_PERC as i128)..(5 * UNIT_PERC as i128),
    ) {
        let mut h = harness(PerpParams::default());
        let old = h.issue("bond-0", START + 10);
        h.engine.deposit(&mut h.chain, &addr("alice"), &old, collateral).unwrap();
        h.chain.clock().advance(10);
        let fresh = h.issue("bond-1", START + 10 + LIFETIME);
        h.pricing.set_price(fresh.clone(), price_in);
        h.fees.set_rollover_fee(fee);

        let ampl = addr("ampl");
        let r = h
            .engine
            .rollover(&mut h.chain, &addr("bob"), &fresh, &ampl, amount_in, u128::MAX)
            .unwrap();
        if r.tranche_in_amt > 0 {
            // Value in (tranche units × price) covers value out at the
            // fee-adjusted rate, never the other way round.
            let value_in = r.tranche_in_amt * price_in;
            let value_out = r.token_out_amt * UNIT_PRICE;
            let h_perc = 100 * UNIT_PERC;
            if fee >= 0 {
                prop_assert!(value_out * h_perc <= value_in * (h_perc - fee as u128));
            } else {
                prop_assert!(value_out * h_perc <= value_in * (h_perc + fee.unsigned_abs()));
            }
            prop_assert!(r.token_out_amt <= collateral);
        }
    }

    /// Total supply never exceeds the configured cap, and a rejected deposit
    /// changes no balance.
    #[test]
    fn caps_hold_with_rollback(
        max_supply in 1u128..5_000,
        deposits in prop::collection::vec(1u128..1_000, 1..20),
    ) {
        let mut h = harness(PerpParams { max_supply, ..Default::default() });
        let tranche = h.issue("bond-0", START + LIFETIME);
        for amt in deposits {
            let before = h.chain.balance_of(&tranche, &addr("alice"));
            match h.engine.deposit(&mut h.chain, &addr("alice"), &tranche, amt) {
                Ok(_) => {}
                Err(PerpError::ExceededMaxSupply { .. }) => {
                    prop_assert_eq!(h.chain.balance_of(&tranche, &addr("alice")), before);
                }
                Err(e) => return Err(TestCaseError::fail(format!("unexpected error {}", e))),
            }
            prop_assert!(h.supply() <= max_supply);
        }
    }

    /// A second refresh without intervening changes is a no-op.
    #[test]
    fn update_state_idempotent(
        deposit in 1u128..10_000,
        advance in 0u64..(2 * LIFETIME),
    ) {
        let mut h = harness(PerpParams::default());
        let tranche = h.issue("bond-0", START + LIFETIME);
        h.engine.deposit(&mut h.chain, &addr("alice"), &tranche, deposit).unwrap();
        h.chain.clock().advance(advance);

        h.engine.update_state(&mut h.chain).unwrap();
        let state = h.engine.export_state().unwrap();
        let value = h.reserve_value_at_face();
        h.engine.update_state(&mut h.chain).unwrap();
        prop_assert_eq!(h.engine.export_state().unwrap(), state);
        prop_assert_eq!(h.reserve_value_at_face(), value);
    }
}
