//! Parameter and configuration errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("invalid tranche maturity bounds: min {min} must not exceed max {max}")]
    InvalidTrancheMaturityBounds { min: u64, max: u64 },

    #[error("fee percentage {perc} is outside the accepted range")]
    FeeOutOfRange { perc: i128 },

    #[error("failed to parse parameters: {0}")]
    Parse(String),
}
