//! Fixed-point units and rounding-aware multiply-divide.
//!
//! Prices carry `PRICE_DECIMALS` decimals and fee percentages carry
//! `PERC_DECIMALS` decimals, so 100% is `HUNDRED_PERC`. Token amounts are raw
//! `u128` units. Every multiply-divide in the engine goes through [`mul_div`]
//! with an explicit [`Rounding`] so each rounding decision is visible at the
//! call site.

/// Number of decimals in a price reported by the pricing strategy.
pub const PRICE_DECIMALS: u8 = 8;

/// The price of one unit of the underlying collateral.
pub const UNIT_PRICE: u128 = 10u128.pow(PRICE_DECIMALS as u32);

/// Number of decimals in a percentage reported by the fee strategy.
pub const PERC_DECIMALS: u8 = 6;

/// One percent.
pub const UNIT_PERC: u128 = 10u128.pow(PERC_DECIMALS as u32);

/// One hundred percent.
pub const HUNDRED_PERC: u128 = 100 * UNIT_PERC;

/// Rounding direction for [`mul_div`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    Down,
    Up,
}

/// Compute `x * y / denominator` with a 256-bit intermediate product.
///
/// Returns `None` if `denominator` is zero or the result does not fit in a
/// `u128`.
pub fn mul_div(x: u128, y: u128, denominator: u128, rounding: Rounding) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    let (hi, lo) = mul_wide(x, y);
    let (quotient, remainder) = div_wide(hi, lo, denominator)?;
    match rounding {
        Rounding::Up if remainder > 0 => quotient.checked_add(1),
        _ => Some(quotient),
    }
}

const LO_MASK: u128 = u64::MAX as u128;

/// Full 128x128 -> 256 bit product as `(high, low)` words.
fn mul_wide(a: u128, b: u128) -> (u128, u128) {
    let (a1, a0) = (a >> 64, a & LO_MASK);
    let (b1, b0) = (b >> 64, b & LO_MASK);

    let p00 = a0 * b0;
    let p01 = a0 * b1;
    let p10 = a1 * b0;
    let p11 = a1 * b1;

    let mid = (p00 >> 64) + (p01 & LO_MASK) + (p10 & LO_MASK);
    let lo = (p00 & LO_MASK) | ((mid & LO_MASK) << 64);
    let hi = p11 + (p01 >> 64) + (p10 >> 64) + (mid >> 64);
    (hi, lo)
}

/// Divide the 256-bit value `(hi, lo)` by `d`, returning `(quotient, remainder)`
/// or `None` when the quotient overflows 128 bits.
fn div_wide(hi: u128, lo: u128, d: u128) -> Option<(u128, u128)> {
    if hi == 0 {
        return Some((lo / d, lo % d));
    }
    if hi >= d {
        return None;
    }
    let mut rem = hi;
    let mut quotient = 0u128;
    for i in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((lo >> i) & 1);
        quotient <<= 1;
        if carry == 1 || rem >= d {
            rem = rem.wrapping_sub(d);
            quotient |= 1;
        }
    }
    Some((quotient, rem))
}
