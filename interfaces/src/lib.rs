//! Abstract collaborator traits for the perpetual tranche reserve engine.
//!
//! The engine never owns token balances, bonds or prices. Every backend
//! (an on-ledger host, the in-memory nullables used in tests) implements these
//! traits, and the engine depends only on the traits.

pub mod bond;
pub mod chain;
pub mod error;
pub mod strategy;
pub mod token;

pub use bond::{BondController, BondIssuer};
pub use chain::{Chain, Checkpoint, Clock};
pub use error::ChainError;
pub use strategy::{FeeStrategy, PricingStrategy};
pub use token::TokenLedger;
