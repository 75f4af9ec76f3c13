//! The surrounding ledger as seen by the engine.

use crate::{BondController, ChainError, TokenLedger};
use perp_types::{Address, Timestamp};

/// Source of the ledger's notion of time.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Transaction model of the surrounding ledger.
///
/// The engine takes a checkpoint before a state-mutating call and rolls back
/// to it if the call fails, so a call either commits all of its effects or
/// none.
pub trait Checkpoint {
    type Snapshot;

    fn checkpoint(&self) -> Self::Snapshot;

    fn rollback(&mut self, snapshot: Self::Snapshot);
}

/// Everything the engine needs from the ledger it runs on.
pub trait Chain: TokenLedger + BondController + Clock + Checkpoint {
    /// Seconds until `bond` matures; zero once its maturity date has passed.
    fn seconds_to_maturity(&self, bond: &Address) -> Result<u64, ChainError> {
        Ok(self.maturity_date(bond)?.seconds_until(self.now()))
    }
}

impl<T> Chain for T where T: TokenLedger + BondController + Clock + Checkpoint {}
