//! Signed rollover fee.

use crate::amount::{mul_div, Rounding, HUNDRED_PERC};
use crate::error::ParamsError;
use serde::{Deserialize, Serialize};

/// The rollover fee reported by the fee strategy.
///
/// A positive percentage is charged to the roller, a negative one is a rebate
/// paid by the system. Each case has its own up/down rounding rule, so the
/// sign is kept in the variant rather than in a flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RolloverFee {
    /// Roller pays this percentage (`PERC_DECIMALS` decimals). At most 100%.
    Charged(u128),
    /// Roller receives this percentage on top of the exchange.
    Rebated(u128),
}

impl RolloverFee {
    pub const ZERO: Self = Self::Charged(0);

    /// Build from the strategy's signed percentage.
    pub fn from_perc(perc: i128) -> Result<Self, ParamsError> {
        let magnitude = perc.unsigned_abs();
        if perc >= 0 {
            if magnitude > HUNDRED_PERC {
                return Err(ParamsError::FeeOutOfRange { perc });
            }
            Ok(Self::Charged(magnitude))
        } else {
            Ok(Self::Rebated(magnitude))
        }
    }

    /// Adjust an outgoing amount: shrink it when charged, grow it when rebated.
    /// Rounds down.
    pub fn apply_to_outgoing(&self, amount: u128) -> Option<u128> {
        match *self {
            Self::Charged(fee) => mul_div(amount, HUNDRED_PERC - fee, HUNDRED_PERC, Rounding::Down),
            Self::Rebated(fee) => mul_div(
                amount,
                HUNDRED_PERC.checked_add(fee)?,
                HUNDRED_PERC,
                Rounding::Down,
            ),
        }
    }

    /// Solve for the incoming amount that yields `amount` after the fee:
    /// grow it when charged, shrink it when rebated. Rounds up so the roller
    /// never gets a better rate than the fee specifies.
    pub fn gross_up_incoming(&self, amount: u128) -> Option<u128> {
        match *self {
            Self::Charged(fee) => mul_div(amount, HUNDRED_PERC, HUNDRED_PERC - fee, Rounding::Up),
            Self::Rebated(fee) => mul_div(
                amount,
                HUNDRED_PERC,
                HUNDRED_PERC.checked_add(fee)?,
                Rounding::Up,
            ),
        }
    }
}

impl Default for RolloverFee {
    fn default() -> Self {
        Self::ZERO
    }
}
