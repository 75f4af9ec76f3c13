//! Non-reentrancy guard for the value-bearing entry points.

use crate::error::PerpError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A held/not-held flag shared by deposit, redeem, rollover and
/// `update_state`.
#[derive(Debug, Default)]
pub(crate) struct ReentrancyGuard {
    entered: Arc<AtomicBool>,
}

/// Proof that the guard is held. Releases it when dropped, on every exit
/// path.
#[must_use = "the guard is released as soon as this value is dropped"]
#[derive(Debug)]
pub(crate) struct Entered {
    flag: Arc<AtomicBool>,
}

impl ReentrancyGuard {
    pub(crate) fn enter(&self) -> Result<Entered, PerpError> {
        self.entered
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|_| PerpError::Reentrancy)?;
        Ok(Entered {
            flag: Arc::clone(&self.entered),
        })
    }

    #[cfg(test)]
    fn is_entered(&self) -> bool {
        self.entered.load(Ordering::Acquire)
    }
}

impl Drop for Entered {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
