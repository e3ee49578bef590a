//! Nullable block clock: deterministic block heights for testing.

use std::cell::Cell;
use tally_types::BlockHeight;

/// A deterministic stand-in for the host chain's block counter.
///
/// Height only advances when you tell it to. Like a development chain that
/// mines one block per transaction, [`NullChain::next_block`] advances and
/// returns the height the next call should be recorded at.
pub struct NullChain {
    current: Cell<u64>,
}

impl NullChain {
    pub fn new(initial_height: u64) -> Self {
        Self {
            current: Cell::new(initial_height),
        }
    }

    /// The current block height.
    pub fn height(&self) -> BlockHeight {
        BlockHeight::new(self.current.get())
    }

    /// Advance by one block and return the new height.
    pub fn next_block(&self) -> BlockHeight {
        self.mine(1);
        self.height()
    }

    /// Advance by `blocks` empty blocks.
    pub fn mine(&self, blocks: u64) {
        self.current.set(self.current.get().saturating_add(blocks));
    }

    /// Set the height to a specific value.
    pub fn set(&self, height: u64) {
        self.current.set(height);
    }
}

impl Default for NullChain {
    fn default() -> Self {
        Self::new(0)
    }
}
