//! Checkpoint storage for the tally ledger.
//!
//! Every checkpointed quantity (balances, vote power) is kept as one
//! append-only [`Timeline`] per account. Writes always land at or after the
//! last recorded height, so a timeline stays sorted by construction and
//! point-in-time reads are a binary search.

pub mod checkpoint_store;
pub mod error;
pub mod timeline;

pub use checkpoint_store::CheckpointStore;
pub use error::StoreError;
pub use timeline::Timeline;
