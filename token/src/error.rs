use tally_governance::GovernanceError;
use tally_ledger::LedgerError;
use tally_store::StoreError;
use tally_types::BlockHeight;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("clock went backwards: last height {last}, call at {now}")]
    ClockRegression { last: BlockHeight, now: BlockHeight },

    #[error("conservation violated at {height}: {quantity} sums to {actual}, supply is {expected}")]
    ConservationViolated {
        height: BlockHeight,
        quantity: &'static str,
        actual: u128,
        expected: u128,
    },

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Governance(#[from] GovernanceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Flat classification of every failure a caller can observe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ZeroAddress,
    InsufficientBalance,
    FutureVersion,
    SelfDelegation,
    PercentOutOfRange,
    TotalDelegationExceeded,
    MaxDelegateesExceeded,
    /// Internal-consistency faults: clock regressions, out-of-order writes,
    /// arithmetic overflow, conservation breaks.
    Internal,
    Snapshot,
    Config,
}

impl TokenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ClockRegression { .. } | Self::ConservationViolated { .. } => ErrorKind::Internal,
            Self::Snapshot(_) => ErrorKind::Snapshot,
            Self::Config(_) => ErrorKind::Config,
            Self::Ledger(e) => ledger_kind(e),
            Self::Governance(e) => match e {
                GovernanceError::SelfDelegation => ErrorKind::SelfDelegation,
                GovernanceError::ZeroDelegatee => ErrorKind::ZeroAddress,
                GovernanceError::PercentOutOfRange { .. } => ErrorKind::PercentOutOfRange,
                GovernanceError::TotalDelegationExceeded { .. } => {
                    ErrorKind::TotalDelegationExceeded
                }
                GovernanceError::MaxDelegateesExceeded { .. } => ErrorKind::MaxDelegateesExceeded,
                GovernanceError::InvalidDelegationSet(_) => ErrorKind::Snapshot,
                GovernanceError::Store(e) => store_kind(e),
            },
            Self::Store(e) => store_kind(e),
        }
    }
}

fn ledger_kind(e: &LedgerError) -> ErrorKind {
    match e {
        LedgerError::ZeroAddress => ErrorKind::ZeroAddress,
        LedgerError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
        LedgerError::Overflow => ErrorKind::Internal,
        LedgerError::Store(e) => store_kind(e),
    }
}

fn store_kind(e: &StoreError) -> ErrorKind {
    match e {
        StoreError::FutureVersion { .. } => ErrorKind::FutureVersion,
        StoreError::OutOfOrderWrite { .. } => ErrorKind::Internal,
    }
}
