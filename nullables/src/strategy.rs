//! Nullable pricing and fee strategies.

use perp_interfaces::{FeeStrategy, PricingStrategy};
use perp_types::{Address, PERC_DECIMALS, PRICE_DECIMALS, UNIT_PRICE};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Fixed-table pricing. Tranches without an explicit price are worth
/// `default_price`.
#[derive(Clone, Debug)]
pub struct NullPricing {
    prices: Arc<Mutex<HashMap<Address, u128>>>,
    default_price: u128,
    decimals: u8,
}

impl NullPricing {
    /// Every tranche priced at one unit of collateral.
    pub fn new() -> Self {
        Self {
            prices: Arc::new(Mutex::new(HashMap::new())),
            default_price: UNIT_PRICE,
            decimals: PRICE_DECIMALS,
        }
    }

    /// Report a non-standard number of decimals.
    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn set_price(&self, tranche: impl Into<Address>, price: u128) {
        self.prices.lock().unwrap().insert(tranche.into(), price);
    }
}

impl Default for NullPricing {
    fn default() -> Self {
        Self::new()
    }
}

impl PricingStrategy for NullPricing {
    fn compute_tranche_price(&self, tranche: &Address) -> u128 {
        self.prices
            .lock()
            .unwrap()
            .get(tranche)
            .copied()
            .unwrap_or(self.default_price)
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct FeeTable {
    mint: u128,
    burn: u128,
    rollover: i128,
}

/// Fixed fee percentages, zero unless set.
#[derive(Clone, Debug)]
pub struct NullFees {
    table: Arc<Mutex<FeeTable>>,
    decimals: u8,
}

impl NullFees {
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(FeeTable::default())),
            decimals: PERC_DECIMALS,
        }
    }

    /// Report a non-standard number of decimals.
    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn set_mint_fee(&self, perc: u128) {
        self.table.lock().unwrap().mint = perc;
    }

    pub fn set_burn_fee(&self, perc: u128) {
        self.table.lock().unwrap().burn = perc;
    }

    pub fn set_rollover_fee(&self, perc: i128) {
        self.table.lock().unwrap().rollover = perc;
    }
}

impl Default for NullFees {
    fn default() -> Self {
        Self::new()
    }
}

impl FeeStrategy for NullFees {
    fn compute_mint_fee_perc(&self) -> u128 {
        self.table.lock().unwrap().mint
    }

    fn compute_burn_fee_perc(&self) -> u128 {
        self.table.lock().unwrap().burn
    }

    fn compute_rollover_fee_perc(&self) -> i128 {
        self.table.lock().unwrap().rollover
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }
}
