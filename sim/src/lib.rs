//! Scenario simulator for the perpetual tranche reserve engine.
//!
//! Loads a TOML scenario, replays it against [`perp_engine::PerpEngine`]
//! running on the in-memory collaborators from `perp-nullables`, and reports
//! each step's outcome.

pub mod error;
pub mod runner;
pub mod scenario;

pub use error::SimError;
pub use runner::{Detail, Holding, Outcome, Simulation, StepReport, Summary};
pub use scenario::{Scenario, Step};
