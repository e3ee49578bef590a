//! The tally token: a fixed-supply balance ledger with fractional vote
//! delegation and historical, block-indexed queries.
//!
//! [`Token`] is the single entry point. It is a sequential state machine:
//! every state-changing call receives the current block height from the
//! caller and either applies completely or fails without touching any
//! timeline.

pub mod config;
pub mod error;
pub mod snapshot;
pub mod token;

pub use config::{GenesisConfig, TokenConfig};
pub use error::{ErrorKind, TokenError};
pub use snapshot::{AccountHistory, DelegationSet, TokenSnapshot, SNAPSHOT_VERSION};
pub use token::Token;

pub use tally_governance::{Delegation, DelegationChange, DelegationLimits, VotePower};
pub use tally_ledger::{Genesis, TransferOutcome};
pub use tally_types::{Account, BlockHeight, Checkpoint};
