//! Block height: the external logical clock every checkpoint is keyed by.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The height of the host chain at the moment a state change is recorded.
///
/// Heights are supplied by the caller and never decrease over the lifetime of
/// a ledger.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BlockHeight(u64);

impl BlockHeight {
    /// The first height of any chain.
    pub const GENESIS: Self = Self(0);

    pub fn new(height: u64) -> Self {
        Self(height)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// The height directly after this one.
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// The height directly before this one, if any.
    pub fn prev(&self) -> Option<Self> {
        self.0.checked_sub(1).map(Self)
    }
}

impl fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for BlockHeight {
    fn from(height: u64) -> Self {
        Self(height)
    }
}
