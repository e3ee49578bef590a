//! Genesis mint, the single issuance event of a ledger.

use serde::{Deserialize, Serialize};
use tally_types::{Account, BlockHeight};

/// Initial state of a ledger: the whole supply credited to one owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genesis {
    /// Account receiving the full supply.
    pub owner: Account,
    /// Fixed total supply in raw units.
    pub total_supply: u128,
    /// Height at which the supply is minted.
    pub height: BlockHeight,
}

impl Genesis {
    pub fn new(owner: Account, total_supply: u128, height: BlockHeight) -> Self {
        Self {
            owner,
            total_supply,
            height,
        }
    }
}
