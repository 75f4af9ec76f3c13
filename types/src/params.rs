//! Engine parameters: minting limits and the tolerable tranche maturity window.
//!
//! Every field can be changed by the owner at runtime; these are the values a
//! fresh engine starts from.

use crate::error::ParamsError;
use serde::{Deserialize, Serialize};

/// Tunable parameters of the reserve engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerpParams {
    // ── Maturity window ──────────────────────────────────────────────────
    /// A bond is acceptable only while its time-to-maturity is at least this
    /// many seconds (inclusive lower bound).
    pub min_tranche_maturity_secs: u64,

    /// A bond is acceptable only while its time-to-maturity is below this
    /// many seconds (exclusive upper bound).
    pub max_tranche_maturity_secs: u64,

    // ── Minting limits ───────────────────────────────────────────────────
    /// Upper bound on the perp token's total supply.
    pub max_supply: u128,

    /// Upper bound on perp tokens minted against any single tranche.
    pub max_mint_amt_per_tranche: u128,
}

impl PerpParams {
    /// Parse parameters from a TOML document. Missing fields take defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ParamsError> {
        let params: Self = toml::from_str(s).map_err(|e| ParamsError::Parse(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.min_tranche_maturity_secs > self.max_tranche_maturity_secs {
            return Err(ParamsError::InvalidTrancheMaturityBounds {
                min: self.min_tranche_maturity_secs,
                max: self.max_tranche_maturity_secs,
            });
        }
        Ok(())
    }

    /// Whether `seconds_to_maturity` lies within `[min, max)`.
    pub fn is_tolerable_maturity(&self, seconds_to_maturity: u64) -> bool {
        seconds_to_maturity >= self.min_tranche_maturity_secs
            && seconds_to_maturity < self.max_tranche_maturity_secs
    }
}

/// An unconstrained deployment: any bond with at least one second left is
/// acceptable and minting is unbounded.
impl Default for PerpParams {
    fn default() -> Self {
        Self {
            min_tranche_maturity_secs: 1,
            max_tranche_maturity_secs: u64::MAX,
            max_supply: u128::MAX,
            max_mint_amt_per_tranche: u128::MAX,
        }
    }
}
