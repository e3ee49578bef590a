//! Per-account ordered checkpoint sequence.

use serde::{Deserialize, Serialize};
use tally_types::{BlockHeight, Checkpoint};

/// Outcome of [`Timeline::push`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushOutcome {
    /// A new checkpoint was appended.
    Appended,
    /// The last checkpoint shared the height and had its value replaced.
    Overwritten,
    /// The pushed height precedes the last checkpoint; nothing was written.
    Rejected { last: BlockHeight },
}

/// Checkpoints of one quantity for one account, strictly ascending by height.
///
/// There is at most one checkpoint per height: writing at the height of the
/// last entry replaces its value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    checkpoints: Vec<Checkpoint>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a timeline from checkpoints, returning `None` unless they are
    /// strictly ascending by height.
    pub fn from_checkpoints(checkpoints: Vec<Checkpoint>) -> Option<Self> {
        let ordered = checkpoints.windows(2).all(|w| w[0].height < w[1].height);
        ordered.then_some(Self { checkpoints })
    }

    /// Record `value` at `height`.
    pub fn push(&mut self, height: BlockHeight, value: u128) -> PushOutcome {
        match self.checkpoints.last_mut() {
            Some(last) if height < last.height => PushOutcome::Rejected { last: last.height },
            Some(last) if height == last.height => {
                last.value = value;
                PushOutcome::Overwritten
            }
            _ => {
                self.checkpoints.push(Checkpoint::new(height, value));
                PushOutcome::Appended
            }
        }
    }

    /// Value of the latest checkpoint at or before `height`, or zero.
    ///
    /// O(log n) in the number of checkpoints.
    pub fn value_at(&self, height: BlockHeight) -> u128 {
        let idx = self.checkpoints.partition_point(|cp| cp.height <= height);
        if idx == 0 {
            0
        } else {
            self.checkpoints[idx - 1].value
        }
    }

    /// The live value: the last checkpoint's value, or zero.
    pub fn latest(&self) -> u128 {
        self.checkpoints.last().map(|cp| cp.value).unwrap_or(0)
    }

    pub fn last_height(&self) -> Option<BlockHeight> {
        self.checkpoints.last().map(|cp| cp.height)
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }
}
