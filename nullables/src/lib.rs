//! Nullable infrastructure for deterministic testing.
//!
//! The token never reads a clock of its own: the host chain supplies the
//! current block height on every call. These stand-ins let tests and the
//! replay tool drive that height by hand.

pub mod clock;

pub use clock::NullChain;
