//! Token state machine.

use crate::error::TokenError;
use std::collections::BTreeSet;
use tally_governance::{
    Delegation, DelegationChange, DelegationLimits, DelegationRegistry, VotePower, VotePowerEngine,
};
use tally_ledger::{BalanceLedger, Genesis, TransferOutcome};
use tally_types::{Account, BlockHeight, Checkpoint};

/// Balances, delegations and vote power of one token.
///
/// All mutation goes through [`Token::transfer`] and [`Token::delegate`].
/// Both check the caller's clock and every validation rule before the first
/// write, so a failed call never leaves a partial update behind.
#[derive(Clone, Debug)]
pub struct Token {
    pub(crate) ledger: BalanceLedger,
    pub(crate) registry: DelegationRegistry,
    pub(crate) engine: VotePowerEngine,
    /// Highest height any state change has been recorded at.
    pub(crate) height: BlockHeight,
}

impl Token {
    /// Create a token and mint the full supply to the genesis owner.
    pub fn new(genesis: &Genesis) -> Result<Self, TokenError> {
        Self::with_limits(genesis, DelegationLimits::default())
    }

    pub fn with_limits(genesis: &Genesis, limits: DelegationLimits) -> Result<Self, TokenError> {
        let ledger = BalanceLedger::new(genesis)?;
        let registry = DelegationRegistry::with_limits(limits);
        let mut engine = VotePowerEngine::new();
        engine.recompute(&ledger, &registry, [genesis.owner], genesis.height)?;
        tracing::info!(
            owner = %genesis.owner,
            supply = genesis.total_supply,
            height = %genesis.height,
            "token created"
        );
        Ok(Self {
            ledger,
            registry,
            engine,
            height: genesis.height,
        })
    }

    fn check_clock(&self, now: BlockHeight) -> Result<(), TokenError> {
        if now < self.height {
            return Err(TokenError::ClockRegression {
                last: self.height,
                now,
            });
        }
        Ok(())
    }

    /// Move `amount` from `from` to `to` at height `now`.
    ///
    /// Republishes vote power for both parties and for every account either
    /// of them delegates to.
    pub fn transfer(
        &mut self,
        from: &Account,
        to: &Account,
        amount: u128,
        now: BlockHeight,
    ) -> Result<TransferOutcome, TokenError> {
        let result = self.apply_transfer(from, to, amount, now);
        match &result {
            Ok(_) => tracing::info!(%from, %to, amount, height = %now, "transfer applied"),
            Err(e) => tracing::warn!(%from, %to, amount, height = %now, error = %e, "transfer rejected"),
        }
        result
    }

    fn apply_transfer(
        &mut self,
        from: &Account,
        to: &Account,
        amount: u128,
        now: BlockHeight,
    ) -> Result<TransferOutcome, TokenError> {
        self.check_clock(now)?;
        let outcome = self.ledger.transfer(from, to, amount, now)?;

        let mut affected = VotePowerEngine::affected_by_balance_change(&self.registry, from);
        affected.extend(VotePowerEngine::affected_by_balance_change(&self.registry, to));
        self.engine
            .recompute(&self.ledger, &self.registry, affected, now)?;

        self.height = now;
        Ok(outcome)
    }

    /// Set `delegator`'s delegation to `delegatee` to `percent` at height `now`.
    ///
    /// A percent of zero removes the delegation.
    pub fn delegate(
        &mut self,
        delegator: &Account,
        delegatee: &Account,
        percent: u32,
        now: BlockHeight,
    ) -> Result<DelegationChange, TokenError> {
        let result = self.apply_delegation(delegator, delegatee, percent, now);
        match &result {
            Ok(change) => tracing::info!(
                %delegator,
                %delegatee,
                previous = change.previous,
                percent,
                height = %now,
                "delegation applied"
            ),
            Err(e) => tracing::warn!(
                %delegator,
                %delegatee,
                percent,
                height = %now,
                error = %e,
                "delegation rejected"
            ),
        }
        result
    }

    fn apply_delegation(
        &mut self,
        delegator: &Account,
        delegatee: &Account,
        percent: u32,
        now: BlockHeight,
    ) -> Result<DelegationChange, TokenError> {
        self.check_clock(now)?;
        let change = self.registry.delegate(delegator, delegatee, percent)?;
        if !change.is_noop() {
            self.engine.recompute(
                &self.ledger,
                &self.registry,
                VotePowerEngine::affected_by_delegation(delegator, delegatee),
                now,
            )?;
        }
        self.height = now;
        Ok(change)
    }

    /// Live balance.
    pub fn balance_of(&self, account: &Account) -> u128 {
        self.ledger.balance_of(account)
    }

    /// Balance as of `version`; `now` is the caller's current height.
    pub fn balance_of_at(
        &self,
        account: &Account,
        version: BlockHeight,
        now: BlockHeight,
    ) -> Result<u128, TokenError> {
        Ok(self.ledger.balance_of_at(account, version, now)?)
    }

    /// Live vote power.
    pub fn vote_power_of(&self, account: &Account) -> u128 {
        self.engine.vote_power_of(account)
    }

    /// Vote power as of `version`; `now` is the caller's current height.
    pub fn vote_power_of_at(
        &self,
        account: &Account,
        version: BlockHeight,
        now: BlockHeight,
    ) -> Result<u128, TokenError> {
        Ok(self.engine.vote_power_of_at(account, version, now)?)
    }

    /// Live vote power split into retained and incoming shares.
    pub fn vote_power_breakdown(&self, account: &Account) -> VotePower {
        VotePowerEngine::breakdown(&self.ledger, &self.registry, account)
    }

    /// Outgoing delegations of `account`, in insertion order.
    pub fn delegations_of(&self, account: &Account) -> &[Delegation] {
        self.registry.delegations_of(account)
    }

    pub fn delegated_percent(&self, account: &Account) -> u32 {
        self.registry.delegated_percent(account)
    }

    /// Accounts delegating to `account`, with their percent.
    pub fn delegators_of(&self, account: &Account) -> Vec<(Account, u8)> {
        self.registry
            .delegators_of(account)
            .map(|(d, p)| (*d, p))
            .collect()
    }

    pub fn balance_history(&self, account: &Account) -> &[Checkpoint] {
        self.ledger.history(account)
    }

    pub fn vote_power_history(&self, account: &Account) -> &[Checkpoint] {
        self.engine.history(account)
    }

    pub fn total_supply(&self) -> u128 {
        self.ledger.total_supply()
    }

    /// Highest height a state change has been recorded at.
    pub fn height(&self) -> BlockHeight {
        self.height
    }

    pub fn limits(&self) -> DelegationLimits {
        self.registry.limits()
    }

    /// Every account with a balance or vote-power history, in order.
    pub fn accounts(&self) -> BTreeSet<Account> {
        self.ledger
            .accounts()
            .chain(self.engine.accounts())
            .copied()
            .collect()
    }

    /// Verify that balances and vote power each sum to the total supply at
    /// `version`.
    pub fn check_conservation(
        &self,
        version: BlockHeight,
        now: BlockHeight,
    ) -> Result<(), TokenError> {
        let expected = self.total_supply();
        let mut balances = 0u128;
        let mut powers = 0u128;
        for account in self.accounts() {
            balances = balances.saturating_add(self.balance_of_at(&account, version, now)?);
            powers = powers.saturating_add(self.vote_power_of_at(&account, version, now)?);
        }
        for (quantity, actual) in [("balances", balances), ("vote power", powers)] {
            if actual != expected {
                return Err(TokenError::ConservationViolated {
                    height: version,
                    quantity,
                    actual,
                    expected,
                });
            }
        }
        Ok(())
    }
}
