//! Nullable bond issuer.

use perp_interfaces::BondIssuer;
use perp_types::Address;
use std::sync::{Arc, Mutex};

/// A bond issuer whose "latest bond" is set by the test.
///
/// Clones share state, so a test can keep one handle after giving another
/// to the engine.
#[derive(Clone, Debug)]
pub struct NullBondIssuer {
    collateral: Address,
    latest: Arc<Mutex<Option<Address>>>,
}

impl NullBondIssuer {
    pub fn new(collateral: impl Into<Address>) -> Self {
        Self {
            collateral: collateral.into(),
            latest: Arc::new(Mutex::new(None)),
        }
    }

    /// Report `bond` as the latest issued bond.
    pub fn issue(&self, bond: impl Into<Address>) {
        *self.latest.lock().unwrap() = Some(bond.into());
    }
}

impl BondIssuer for NullBondIssuer {
    fn collateral_token(&self) -> Address {
        self.collateral.clone()
    }

    fn latest_bond(&self) -> Option<Address> {
        self.latest.lock().unwrap().clone()
    }
}
