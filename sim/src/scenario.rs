//! Scenario files.
//!
//! A scenario names the collateral, the engine parameters and a list of
//! steps. Amounts are plain integers in token base units; prices are scaled
//! by `UNIT_PRICE` and fees by `UNIT_PERC`.
//!
//! ```toml
//! collateral = "ampl"
//! start_time = 1000
//!
//! [params]
//! max_tranche_maturity_secs = 2592000
//!
//! [[steps]]
//! action = "issue"
//! bond = "bond-1"
//! maturity_in = 864000
//! ratios = [200, 800]
//! fund = [{ holder = "alice", amount = 5000 }]
//!
//! [[steps]]
//! action = "deposit"
//! caller = "alice"
//! tranche = "bond-1-0"
//! amount = 500
//! ```

use crate::error::SimError;
use perp_types::PerpParams;
use serde::Deserialize;
use std::path::Path;

fn default_start_time() -> u64 {
    1
}

fn default_owner() -> String {
    "owner".to_string()
}

fn default_ratios() -> Vec<u64> {
    vec![1_000]
}

/// A parsed scenario file.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub collateral: String,
    #[serde(default = "default_start_time")]
    pub start_time: u64,
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default)]
    pub params: ParamsConfig,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Engine parameters as they appear in a scenario. Omitted limits are
/// unbounded.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParamsConfig {
    pub min_tranche_maturity_secs: Option<u64>,
    pub max_tranche_maturity_secs: Option<u64>,
    pub max_supply: Option<u64>,
    pub max_mint_amt_per_tranche: Option<u64>,
}

impl ParamsConfig {
    pub fn to_params(&self) -> Result<PerpParams, SimError> {
        let defaults = PerpParams::default();
        let params = PerpParams {
            min_tranche_maturity_secs: self
                .min_tranche_maturity_secs
                .unwrap_or(defaults.min_tranche_maturity_secs),
            max_tranche_maturity_secs: self
                .max_tranche_maturity_secs
                .unwrap_or(defaults.max_tranche_maturity_secs),
            max_supply: self.max_supply.map_or(defaults.max_supply, u128::from),
            max_mint_amt_per_tranche: self
                .max_mint_amt_per_tranche
                .map_or(defaults.max_mint_amt_per_tranche, u128::from),
        };
        params.validate()?;
        Ok(params)
    }
}

/// Collateral granted to `holder` and deposited into a newly issued bond.
#[derive(Debug, Clone, Deserialize)]
pub struct Funding {
    pub holder: String,
    pub amount: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Create a bond maturing `maturity_in` seconds from now, fund holders
    /// with its tranches, and report it as the issuer's latest bond.
    Issue {
        bond: String,
        maturity_in: u64,
        #[serde(default = "default_ratios")]
        ratios: Vec<u64>,
        #[serde(default)]
        fund: Vec<Funding>,
    },
    Deposit {
        caller: String,
        tranche: String,
        amount: u64,
    },
    Redeem {
        caller: String,
        amount: u64,
    },
    Rollover {
        caller: String,
        tranche_in: String,
        token_out: String,
        amount: u64,
        /// Upper bound on the outgoing amount; unbounded when omitted.
        requested: Option<u64>,
    },
    Advance {
        secs: u64,
    },
    SetPrice {
        tranche: String,
        price: u64,
    },
    SetFees {
        mint: Option<u64>,
        burn: Option<u64>,
        rollover: Option<i64>,
    },
}

impl Step {
    pub fn action(&self) -> &'static str {
        match self {
            Step::Issue { .. } => "issue",
            Step::Deposit { .. } => "deposit",
            Step::Redeem { .. } => "redeem",
            Step::Rollover { .. } => "rollover",
            Step::Advance { .. } => "advance",
            Step::SetPrice { .. } => "set_price",
            Step::SetFees { .. } => "set_fees",
        }
    }
}

impl Scenario {
    pub fn from_toml_str(s: &str) -> Result<Self, SimError> {
        toml::from_str(s).map_err(|e| SimError::Parse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, SimError> {
        let contents = std::fs::read_to_string(path).map_err(|source| SimError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}
