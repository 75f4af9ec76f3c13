//! Perpetual tranche reserve engine.
//!
//! Tracks the reserve of tranche tokens and collateral that backs the perp
//! token, and implements the three value-bearing operations against it:
//! deposit (mint), redeem (burn) and rollover. Every operation first brings
//! time-dependent state current, then commits all of its effects or none.
//!
//! The engine never owns the ledger. Callers pass a [`perp_interfaces::Chain`]
//! by mutable reference to each call; the bond issuer and the pricing and fee
//! strategies are owned by the engine and swappable by its owner.

mod acceptance;
mod admin;
mod engine;
pub mod error;
pub mod events;
mod guard;
mod mint;
mod redeem;
pub mod reserve;
mod rollover;
pub mod state;
mod views;

#[cfg(test)]
mod testing;

pub use engine::{Collaborators, PerpEngine};
pub use error::PerpError;
pub use events::PerpEvent;
pub use reserve::ReserveSet;
pub use rollover::RolloverData;
pub use state::PerpState;
