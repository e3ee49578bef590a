//! Delegation limits.

use serde::{Deserialize, Serialize};

/// Most distinct delegatees a single account may have.
pub const MAX_DELEGATEES: usize = 5;

/// Percent is expressed in whole points; this is both the cap for a single
/// delegation and for an account's total outgoing delegation.
pub const MAX_PERCENT: u8 = 100;

/// Bounds enforced by the delegation registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationLimits {
    pub max_delegatees: usize,
    pub max_percent: u8,
}

impl Default for DelegationLimits {
    fn default() -> Self {
        Self {
            max_delegatees: MAX_DELEGATEES,
            max_percent: MAX_PERCENT,
        }
    }
}
