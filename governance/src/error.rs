use tally_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("trying to delegate to self")]
    SelfDelegation,

    #[error("trying to delegate to the zero address")]
    ZeroDelegatee,

    #[error("trying to delegate over 100%: {percent}%")]
    PercentOutOfRange { percent: u32 },

    #[error("total delegation over 100%: would reach {total}%")]
    TotalDelegationExceeded { total: u32 },

    #[error("maximum {max} delegatees")]
    MaxDelegateesExceeded { max: usize },

    #[error("invalid delegation set: {0}")]
    InvalidDelegationSet(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
