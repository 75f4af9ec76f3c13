//! Pricing and fee oracles.
//!
//! Both are pure lookups from the engine's point of view. Their reported
//! decimals are validated against `PRICE_DECIMALS` / `PERC_DECIMALS` whenever
//! a strategy is installed.

use perp_types::Address;

pub trait PricingStrategy {
    /// Price of one tranche token in underlying units, `decimals()` decimals.
    /// Zero means the tranche cannot currently be priced.
    fn compute_tranche_price(&self, tranche: &Address) -> u128;

    fn decimals(&self) -> u8;
}

pub trait FeeStrategy {
    /// Percentage of newly minted perps withheld as a fee.
    fn compute_mint_fee_perc(&self) -> u128;

    /// Percentage of redeemed reserve assets withheld as a fee.
    fn compute_burn_fee_perc(&self) -> u128;

    /// Positive: charged to the roller. Negative: paid to the roller.
    fn compute_rollover_fee_perc(&self) -> i128;

    fn decimals(&self) -> u8;
}
