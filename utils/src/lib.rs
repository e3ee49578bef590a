//! Shared utilities for the tally token.

pub mod logging;

pub use logging::{init_logging, LogFormat};
