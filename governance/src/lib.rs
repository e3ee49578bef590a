//! Vote delegation and vote power for the tally ledger.
//!
//! An account may hand out fixed percentages of its voting power to up to
//! five other accounts without moving any tokens. Vote power is derived from
//! balances and delegations and republished as checkpoints whenever either
//! changes:
//!
//! ```text
//! outgoing(A)  = Σ floor(balance(A) × p / 100)   over A's delegations (d, p)
//! retained(A)  = balance(A) − outgoing(A)
//! incoming(A)  = Σ floor(balance(D) × p / 100)   over delegators D with (A, p)
//! votePower(A) = retained(A) + incoming(A)
//! ```
//!
//! Delegation is single-level: power received by a delegatee is never
//! passed on.

pub mod delegation;
pub mod error;
pub mod params;
pub mod vote_power;

pub use delegation::{Delegation, DelegationChange, DelegationRegistry};
pub use error::GovernanceError;
pub use params::{DelegationLimits, MAX_DELEGATEES, MAX_PERCENT};
pub use vote_power::{VotePower, VotePowerEngine};
