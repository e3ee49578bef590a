use tally_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("transfer to the zero address")]
    ZeroAddress,

    #[error("sender balance too small: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("arithmetic overflow crediting receiver")]
    Overflow,

    #[error(transparent)]
    Store(#[from] StoreError),
}
