//! Keyed collection of checkpoint timelines.

use crate::error::StoreError;
use crate::timeline::{PushOutcome, Timeline};
use std::collections::HashMap;
use tally_types::{Account, BlockHeight, Checkpoint};

/// One [`Timeline`] per account for a single checkpointed quantity.
///
/// Timelines are created lazily on the first write that changes an account's
/// value; before that every read returns zero.
#[derive(Clone, Debug, Default)]
pub struct CheckpointStore {
    timelines: HashMap<Account, Timeline>,
}

impl CheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` for `account` at `height`.
    ///
    /// A write at the height of the account's last checkpoint replaces it. A
    /// write that would not change the live value is skipped. Writing below
    /// the last checkpoint is an internal-consistency fault and fails with
    /// [`StoreError::OutOfOrderWrite`].
    pub fn write(
        &mut self,
        account: &Account,
        height: BlockHeight,
        value: u128,
    ) -> Result<(), StoreError> {
        self.check_write(account, height)?;
        if let Some(timeline) = self.timelines.get(account) {
            if timeline.latest() == value {
                return Ok(());
            }
        } else if value == 0 {
            return Ok(());
        }

        match self.timelines.entry(*account).or_default().push(height, value) {
            PushOutcome::Rejected { last } => Err(StoreError::OutOfOrderWrite {
                account: *account,
                last,
                attempted: height,
            }),
            PushOutcome::Appended | PushOutcome::Overwritten => Ok(()),
        }
    }

    /// Fail with [`StoreError::OutOfOrderWrite`] if a write for `account` at
    /// `height` would land below its last checkpoint. Writes nothing.
    pub fn check_write(&self, account: &Account, height: BlockHeight) -> Result<(), StoreError> {
        match self.last_height(account) {
            Some(last) if height < last => Err(StoreError::OutOfOrderWrite {
                account: *account,
                last,
                attempted: height,
            }),
            _ => Ok(()),
        }
    }

    /// Height of `account`'s last checkpoint, if any.
    pub fn last_height(&self, account: &Account) -> Option<BlockHeight> {
        self.timelines.get(account).and_then(Timeline::last_height)
    }

    /// Value for `account` as of `version`.
    ///
    /// Fails with [`StoreError::FutureVersion`] when `version` is beyond the
    /// caller's `current` height: state past the current block is not final.
    pub fn read(
        &self,
        account: &Account,
        version: BlockHeight,
        current: BlockHeight,
    ) -> Result<u128, StoreError> {
        if version > current {
            return Err(StoreError::FutureVersion {
                requested: version,
                current,
            });
        }
        Ok(self
            .timelines
            .get(account)
            .map(|t| t.value_at(version))
            .unwrap_or(0))
    }

    /// The live value for `account`.
    pub fn latest(&self, account: &Account) -> u128 {
        self.timelines.get(account).map(Timeline::latest).unwrap_or(0)
    }

    /// Full checkpoint history for `account`, oldest first.
    pub fn history(&self, account: &Account) -> &[Checkpoint] {
        self.timelines
            .get(account)
            .map(Timeline::checkpoints)
            .unwrap_or(&[])
    }

    /// Every account that has at least one checkpoint.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.timelines.keys()
    }

    /// Every timeline, keyed by account.
    pub fn timelines(&self) -> impl Iterator<Item = (&Account, &Timeline)> {
        self.timelines.iter()
    }

    /// Install a whole timeline for `account`, replacing any existing one.
    pub fn insert_timeline(&mut self, account: Account, timeline: Timeline) {
        if timeline.is_empty() {
            self.timelines.remove(&account);
        } else {
            self.timelines.insert(account, timeline);
        }
    }

    /// Total number of checkpoints across all accounts.
    pub fn checkpoint_count(&self) -> usize {
        self.timelines.values().map(Timeline::len).sum()
    }
}
