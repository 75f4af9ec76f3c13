//! Shared utilities for the perpetual tranche workspace.

pub mod logging;

pub use logging::{init_logging, LogFormat};
