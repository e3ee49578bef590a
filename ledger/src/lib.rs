//! Checkpointed balance ledger.
//!
//! Balances are a checkpointed quantity: every transfer records the new
//! balances of both parties at the current block height, so the balance of
//! any account can be read back at any finalized height.
//!
//! The total supply is minted once at genesis and never changes afterwards.

pub mod balances;
pub mod error;
pub mod genesis;

pub use balances::{BalanceLedger, TransferOutcome};
pub use error::LedgerError;
pub use genesis::Genesis;
