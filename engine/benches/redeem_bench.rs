use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use perp_engine::{Collaborators, PerpEngine};
use perp_interfaces::TokenLedger;
use perp_nullables::{NullBondIssuer, NullChain, NullFees, NullPricing};
use perp_types::{Address, PerpParams, Timestamp};

const START: u64 = 1_000;
const DEPOSIT: u128 = 1_000;

/// An engine whose reserve holds `tranche_count` live tranches, one per bond.
/// The maturity window is left wide open so none of them is ever swept.
fn engine_with_reserve(tranche_count: usize) -> (NullChain, PerpEngine) {
    let mut chain = NullChain::new(START);
    let issuer = NullBondIssuer::new("ampl");
    let mut engine = PerpEngine::new(
        Address::new("perp"),
        Address::new("owner"),
        Address::new("ampl"),
        PerpParams::default(),
        Collaborators {
            bond_issuer: Box::new(issuer.clone()),
            pricing_strategy: Box::new(NullPricing::new()),
            fee_strategy: Box::new(NullFees::new()),
        },
    )
    .unwrap();

    let holder = Address::new("holder");
    let ampl = Address::new("ampl");
    for i in 0..tranche_count {
        let bond = format!("bond-{}", i);
        let tranches = chain.create_bond(
            bond.as_str(),
            "ampl",
            Timestamp::new(START + 1_000_000 + i as u64),
            &[1_000],
        );
        chain.mint(&ampl, &holder, DEPOSIT).unwrap();
        chain
            .deposit_into_bond(&Address::new(bond.as_str()), &holder, DEPOSIT)
            .unwrap();
        issuer.issue(bond.as_str());
        engine
            .deposit(&mut chain, &holder, &tranches[0], DEPOSIT)
            .unwrap();
    }
    (chain, engine)
}

fn bench_redeem(c: &mut Criterion) {
    let mut group = c.benchmark_group("redeem");
    let holder = Address::new("holder");

    for tranche_count in [1, 10, 50, 200] {
        let (chain, engine_state) = engine_with_reserve(tranche_count);
        let bytes = engine_state.export_state().unwrap();

        group.bench_with_input(
            BenchmarkId::new("reserve_size", tranche_count),
            &tranche_count,
            |b, _| {
                b.iter_batched(
                    || {
                        let engine = PerpEngine::restore(
                            Address::new("perp"),
                            &bytes,
                            Collaborators {
                                bond_issuer: Box::new(NullBondIssuer::new("ampl")),
                                pricing_strategy: Box::new(NullPricing::new()),
                                fee_strategy: Box::new(NullFees::new()),
                            },
                        )
                        .unwrap();
                        (snapshot(&chain), engine)
                    },
                    |(mut chain, mut engine)| {
                        black_box(engine.redeem(&mut chain, &holder, black_box(1)).unwrap())
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

fn bench_compute_redemption(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_redemption_amts");

    for tranche_count in [1, 10, 50, 200] {
        let (mut chain, mut engine) = engine_with_reserve(tranche_count);
        let supply = chain.total_supply(engine.address());

        group.bench_with_input(
            BenchmarkId::new("reserve_size", tranche_count),
            &tranche_count,
            |b, _| {
                b.iter(|| {
                    black_box(
                        engine
                            .compute_redemption_amts(&mut chain, black_box(supply / 2))
                            .unwrap(),
                    )
                });
            },
        );
    }

    group.finish();
}

fn snapshot(chain: &NullChain) -> NullChain {
    use perp_interfaces::Checkpoint;
    let mut copy = NullChain::new(START);
    copy.rollback(chain.checkpoint());
    copy
}

criterion_group!(benches, bench_redeem, bench_compute_redemption);
criterion_main!(benches);
