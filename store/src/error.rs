use tally_types::{Account, BlockHeight};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("block {requested} is in the future (current height {current})")]
    FutureVersion {
        requested: BlockHeight,
        current: BlockHeight,
    },

    #[error("out-of-order write for {account}: attempted {attempted}, last checkpoint at {last}")]
    OutOfOrderWrite {
        account: Account,
        last: BlockHeight,
        attempted: BlockHeight,
    },
}
