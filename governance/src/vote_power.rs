//! Checkpointed vote power, derived from balances and delegations.
//!
//! Vote power is a materialized view: nothing writes it except
//! [`VotePowerEngine::recompute`], which the caller invokes for the accounts
//! a balance or delegation change invalidated.

use crate::delegation::DelegationRegistry;
use crate::error::GovernanceError;
use crate::params::MAX_PERCENT;
use std::collections::BTreeSet;
use tally_ledger::BalanceLedger;
use tally_store::{CheckpointStore, Timeline};
use tally_types::{Account, BlockHeight, Checkpoint};

/// The two components of an account's vote power.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VotePower {
    /// Own balance minus everything delegated away.
    pub retained: u128,
    /// Sum of shares delegated in by other accounts.
    pub incoming: u128,
}

impl VotePower {
    pub fn total(&self) -> u128 {
        self.retained + self.incoming
    }
}

/// Owns every account's vote-power timeline.
#[derive(Clone, Debug, Default)]
pub struct VotePowerEngine {
    powers: CheckpointStore,
}

impl VotePowerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an engine from previously captured timelines.
    pub fn from_timelines(timelines: impl IntoIterator<Item = (Account, Timeline)>) -> Self {
        let mut powers = CheckpointStore::new();
        for (account, timeline) in timelines {
            powers.insert_timeline(account, timeline);
        }
        Self { powers }
    }

    /// `floor(balance × percent / 100)` without overflowing for any balance.
    pub fn share(balance: u128, percent: u8) -> u128 {
        let scale = u128::from(MAX_PERCENT);
        let p = u128::from(percent);
        (balance / scale) * p + (balance % scale) * p / scale
    }

    /// Sum of the truncated shares `account` delegates away.
    pub fn outgoing(ledger: &BalanceLedger, registry: &DelegationRegistry, account: &Account) -> u128 {
        let balance = ledger.balance_of(account);
        registry
            .delegations_of(account)
            .iter()
            .map(|d| Self::share(balance, d.percent))
            .sum()
    }

    /// Sum of the truncated shares delegated to `account`.
    pub fn incoming(ledger: &BalanceLedger, registry: &DelegationRegistry, account: &Account) -> u128 {
        registry
            .delegators_of(account)
            .map(|(delegator, percent)| Self::share(ledger.balance_of(delegator), percent))
            .sum()
    }

    /// Live vote power of `account`, split into retained and incoming.
    ///
    /// The retained share is the balance minus the individually truncated
    /// outgoing shares, so every truncation remainder stays with the
    /// delegator and the total across accounts equals the supply exactly.
    pub fn breakdown(
        ledger: &BalanceLedger,
        registry: &DelegationRegistry,
        account: &Account,
    ) -> VotePower {
        let balance = ledger.balance_of(account);
        VotePower {
            retained: balance - Self::outgoing(ledger, registry, account),
            incoming: Self::incoming(ledger, registry, account),
        }
    }

    /// Accounts whose vote power changes when `account`'s balance changes:
    /// the account itself and everyone it delegates to.
    pub fn affected_by_balance_change(registry: &DelegationRegistry, account: &Account) -> Vec<Account> {
        std::iter::once(*account)
            .chain(registry.delegations_of(account).iter().map(|d| d.delegatee))
            .collect()
    }

    /// Accounts whose vote power changes when `delegator` re-delegates to
    /// `delegatee`.
    pub fn affected_by_delegation(delegator: &Account, delegatee: &Account) -> Vec<Account> {
        vec![*delegator, *delegatee]
    }

    /// Republish vote power at `at` for each of `accounts`.
    ///
    /// Accounts are deduplicated and processed in ascending order. Returns
    /// the published `(account, vote power)` pairs.
    pub fn recompute(
        &mut self,
        ledger: &BalanceLedger,
        registry: &DelegationRegistry,
        accounts: impl IntoIterator<Item = Account>,
        at: BlockHeight,
    ) -> Result<Vec<(Account, u128)>, GovernanceError> {
        let targets: BTreeSet<Account> = accounts.into_iter().collect();
        let mut published = Vec::with_capacity(targets.len());
        for account in targets {
            let power = Self::breakdown(ledger, registry, &account);
            self.powers.write(&account, at, power.total())?;
            tracing::debug!(
                %account,
                height = %at,
                retained = power.retained,
                incoming = power.incoming,
                "vote power republished"
            );
            published.push((account, power.total()));
        }
        Ok(published)
    }

    /// Live vote power.
    pub fn vote_power_of(&self, account: &Account) -> u128 {
        self.powers.latest(account)
    }

    /// Vote power as of `version`; fails when `version` is past `current`.
    pub fn vote_power_of_at(
        &self,
        account: &Account,
        version: BlockHeight,
        current: BlockHeight,
    ) -> Result<u128, GovernanceError> {
        Ok(self.powers.read(account, version, current)?)
    }

    pub fn history(&self, account: &Account) -> &[Checkpoint] {
        self.powers.history(account)
    }

    /// Every account that has ever held vote power.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.powers.accounts()
    }

    pub fn timelines(&self) -> impl Iterator<Item = (&Account, &Timeline)> {
        self.powers.timelines()
    }
}
