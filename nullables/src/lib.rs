//! Nullable infrastructure for deterministic testing.
//!
//! Inspired by the "A-frame architecture" pattern from RsNano.
//! Every collaborator of the reserve engine (token ledger, bonds, clock,
//! bond issuer, pricing and fee strategies) is abstracted behind a trait in
//! `perp-interfaces`. This crate provides in-memory implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically, even after being handed to the engine
//! - Never touch the filesystem or network
//!
//! Usage: build a `NullChain`, create bonds on it, and hand the engine
//! clones of the strategy handles while keeping one clone to steer them.

pub mod chain;
pub mod clock;
pub mod issuer;
pub mod strategy;

pub use chain::{NullBond, NullChain};
pub use clock::NullClock;
pub use issuer::NullBondIssuer;
pub use strategy::{NullFees, NullPricing};
