//! Fundamental types for the tally ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account identifiers, block heights, checkpoints, and the shared error type.

pub mod address;
pub mod checkpoint;
pub mod error;
pub mod height;

pub use address::Account;
pub use checkpoint::Checkpoint;
pub use error::TypesError;
pub use height::BlockHeight;
