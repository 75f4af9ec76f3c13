#![no_main]

use libfuzzer_sys::fuzz_target;
use perp_engine::{Collaborators, PerpEngine, PerpState};
use perp_nullables::{NullBondIssuer, NullFees, NullPricing};
use perp_types::Address;

fn collaborators(collateral: Address) -> Collaborators {
    Collaborators {
        bond_issuer: Box::new(NullBondIssuer::new(collateral)),
        pricing_strategy: Box::new(NullPricing::new()),
        fee_strategy: Box::new(NullFees::new()),
    }
}

// Restoring an engine from arbitrary bytes must fail cleanly, never panic.
// Bytes that decode are restored against a matching issuer, so parameter
// validation runs, and a restored engine must export the state it loaded.
fuzz_target!(|data: &[u8]| {
    let collateral = match bincode::deserialize::<PerpState>(data) {
        Ok(state) => state.reserves.collateral().clone(),
        Err(_) => Address::new("ampl"),
    };

    if let Ok(engine) = PerpEngine::restore(Address::new("perp"), data, collaborators(collateral.clone())) {
        let bytes = engine.export_state().unwrap();
        let again = PerpEngine::restore(Address::new("perp"), &bytes, collaborators(collateral)).unwrap();
        assert_eq!(again.export_state().unwrap(), bytes);
    }
});
