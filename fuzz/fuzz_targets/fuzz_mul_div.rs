#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use perp_types::{mul_div, Rounding, RolloverFee};

#[derive(Debug, Arbitrary)]
struct Input {
    x: u128,
    y: u128,
    d: u128,
    fee_perc: i128,
    amount: u64,
}

// mul_div must never panic, must agree with native arithmetic whenever the
// product fits, and rounding up may exceed rounding down by at most one.
fuzz_target!(|input: Input| {
    let down = mul_div(input.x, input.y, input.d, Rounding::Down);
    let up = mul_div(input.x, input.y, input.d, Rounding::Up);

    if input.d == 0 {
        assert!(down.is_none() && up.is_none());
        return;
    }
    if let Some(product) = input.x.checked_mul(input.y) {
        assert_eq!(down, Some(product / input.d));
    }
    if let (Some(down), Some(up)) = (down, up) {
        assert!(up >= down && up - down <= 1);
    }

    // A grossed-up incoming amount always covers the outgoing amount it was
    // derived from once the fee is taken back off.
    if let Ok(fee) = RolloverFee::from_perc(input.fee_perc) {
        let amount = u128::from(input.amount);
        if let Some(gross) = fee.gross_up_incoming(amount) {
            if let Some(net) = fee.apply_to_outgoing(gross) {
                assert!(net >= amount);
            }
        }
    }
});
