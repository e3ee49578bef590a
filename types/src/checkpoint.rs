//! A single (height, value) point in an account's history.

use crate::height::BlockHeight;
use serde::{Deserialize, Serialize};

/// One recorded value of a checkpointed quantity.
///
/// `value` holds from `height` (inclusive) until the next checkpoint of the
/// same timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checkpoint {
    pub height: BlockHeight,
    pub value: u128,
}

impl Checkpoint {
    pub fn new(height: BlockHeight, value: u128) -> Self {
        Self { height, value }
    }
}
