//! Fundamental types for the perpetual tranche reserve engine.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! addresses, timestamps, fixed-point units and rounding, signed fee percentages,
//! and the engine's tunable parameters.

pub mod address;
pub mod amount;
pub mod error;
pub mod fee;
pub mod params;
pub mod time;

pub use address::Address;
pub use amount::{
    mul_div, Rounding, HUNDRED_PERC, PERC_DECIMALS, PRICE_DECIMALS, UNIT_PERC, UNIT_PRICE,
};
pub use error::ParamsError;
pub use fee::RolloverFee;
pub use params::PerpParams;
pub use time::Timestamp;
