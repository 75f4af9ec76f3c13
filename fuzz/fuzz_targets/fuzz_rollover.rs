#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use perp_engine::{Collaborators, PerpEngine};
use perp_interfaces::TokenLedger;
use perp_nullables::{NullBondIssuer, NullChain, NullFees, NullPricing};
use perp_types::{Address, PerpParams, Timestamp};

#[derive(Debug, Arbitrary)]
struct Input {
    reserve_collateral: u32,
    price_in: u64,
    fee_perc: i64,
    amount_in: u64,
    requested: Option<u64>,
}

// Rollover with arbitrary prices, fees and amounts either succeeds or
// returns an error; it never panics and never pays out more than the
// reserve holds.
fuzz_target!(|input: Input| {
    let mut chain = NullChain::new(1_000);
    let issuer = NullBondIssuer::new("ampl");
    let pricing = NullPricing::new();
    let fees = NullFees::new();
    let mut engine = match PerpEngine::new(
        Address::new("perp"),
        Address::new("owner"),
        Address::new("ampl"),
        PerpParams::default(),
        Collaborators {
            bond_issuer: Box::new(issuer.clone()),
            pricing_strategy: Box::new(pricing.clone()),
            fee_strategy: Box::new(fees.clone()),
        },
    ) {
        Ok(engine) => engine,
        Err(_) => return,
    };

    let ampl = Address::new("ampl");
    let alice = Address::new("alice");
    let bob = Address::new("bob");
    let collateral = u128::from(input.reserve_collateral).max(1);

    // An expiring bond whose tranche matures into the reserve's collateral.
    let old = chain.create_bond("old", "ampl", Timestamp::new(1_010), &[1_000]);
    let _ = chain.mint(&ampl, &alice, collateral);
    let _ = chain.deposit_into_bond(&Address::new("old"), &alice, collateral);
    issuer.issue("old");
    if engine.deposit(&mut chain, &alice, &old[0], collateral).is_err() {
        return;
    }

    chain.clock().advance(10);
    let fresh = chain.create_bond("fresh", "ampl", Timestamp::new(1_000_000), &[1_000]);
    let _ = chain.mint(&ampl, &bob, u128::from(u64::MAX));
    let _ = chain.deposit_into_bond(&Address::new("fresh"), &bob, u128::from(u64::MAX));
    issuer.issue("fresh");
    pricing.set_price(fresh[0].clone(), u128::from(input.price_in));
    fees.set_rollover_fee(i128::from(input.fee_perc));

    if let Ok(r) = engine.rollover(
        &mut chain,
        &bob,
        &fresh[0],
        &ampl,
        u128::from(input.amount_in),
        input.requested.map_or(u128::MAX, u128::from),
    ) {
        assert!(r.token_out_amt <= collateral);
    }
});
