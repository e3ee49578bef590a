//! Token balances as checkpoint timelines.

use crate::error::LedgerError;
use crate::genesis::Genesis;
use tally_store::{CheckpointStore, Timeline};
use tally_types::{Account, BlockHeight, Checkpoint};

/// Balances written by a successful transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferOutcome {
    pub from_balance: u128,
    pub to_balance: u128,
}

/// Owns every account's balance timeline.
///
/// Invariant: the live balances of all accounts sum to `total_supply`, and
/// so do the balances read at any single height.
#[derive(Clone, Debug)]
pub struct BalanceLedger {
    balances: CheckpointStore,
    total_supply: u128,
}

impl BalanceLedger {
    /// Create a ledger and mint the full supply to the genesis owner.
    pub fn new(genesis: &Genesis) -> Result<Self, LedgerError> {
        if genesis.owner.is_zero() && genesis.total_supply > 0 {
            return Err(LedgerError::ZeroAddress);
        }
        let mut balances = CheckpointStore::new();
        balances.write(&genesis.owner, genesis.height, genesis.total_supply)?;
        Ok(Self {
            balances,
            total_supply: genesis.total_supply,
        })
    }

    /// Rebuild a ledger from previously captured timelines.
    pub fn from_timelines(
        total_supply: u128,
        timelines: impl IntoIterator<Item = (Account, Timeline)>,
    ) -> Self {
        let mut balances = CheckpointStore::new();
        for (account, timeline) in timelines {
            balances.insert_timeline(account, timeline);
        }
        Self {
            balances,
            total_supply,
        }
    }

    /// Check a transfer at height `at` without writing anything.
    ///
    /// Self-transfers are still subject to the balance check. Both timelines
    /// must accept a write at `at`, so the two writes in [`Self::transfer`]
    /// either both land or neither is attempted.
    pub fn validate_transfer(
        &self,
        from: &Account,
        to: &Account,
        amount: u128,
        at: BlockHeight,
    ) -> Result<TransferOutcome, LedgerError> {
        if to.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        self.balances.check_write(from, at)?;
        self.balances.check_write(to, at)?;
        let available = self.balance_of(from);
        if amount > available {
            return Err(LedgerError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        if from == to {
            return Ok(TransferOutcome {
                from_balance: available,
                to_balance: available,
            });
        }
        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        Ok(TransferOutcome {
            from_balance: available - amount,
            to_balance,
        })
    }

    /// Move `amount` from `from` to `to`, recording both balances at `at`.
    ///
    /// All checks run before the first write, so a failed transfer leaves
    /// every timeline untouched.
    pub fn transfer(
        &mut self,
        from: &Account,
        to: &Account,
        amount: u128,
        at: BlockHeight,
    ) -> Result<TransferOutcome, LedgerError> {
        let outcome = self.validate_transfer(from, to, amount, at)?;
        self.balances.write(from, at, outcome.from_balance)?;
        self.balances.write(to, at, outcome.to_balance)?;
        Ok(outcome)
    }

    /// Live balance.
    pub fn balance_of(&self, account: &Account) -> u128 {
        self.balances.latest(account)
    }

    /// Balance as of `version`; fails when `version` is past `current`.
    pub fn balance_of_at(
        &self,
        account: &Account,
        version: BlockHeight,
        current: BlockHeight,
    ) -> Result<u128, LedgerError> {
        Ok(self.balances.read(account, version, current)?)
    }

    pub fn history(&self, account: &Account) -> &[Checkpoint] {
        self.balances.history(account)
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Every account that has ever held a balance.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.balances.accounts()
    }

    pub fn timelines(&self) -> impl Iterator<Item = (&Account, &Timeline)> {
        self.balances.timelines()
    }
}
