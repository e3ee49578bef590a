//! Fractional vote delegation.
//!
//! Each account owns an ordered set of at most five `(delegatee, percent)`
//! entries. Percents are whole points; the entries of one account never sum
//! past 100. A zero-percent entry is removed rather than stored.
//!
//! Alongside the forward sets the registry keeps a reverse index
//! (delegatee → delegators) so the accounts whose incoming power depends on a
//! delegator can be found without scanning every set.

use crate::error::GovernanceError;
use crate::params::DelegationLimits;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tally_types::Account;

/// One outgoing delegation entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Delegation {
    pub delegatee: Account,
    pub percent: u8,
}

/// Effect of a single `delegate` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DelegationChange {
    pub delegator: Account,
    pub delegatee: Account,
    /// Percent held by `delegatee` before the call (0 if absent).
    pub previous: u8,
    /// Percent held after the call (0 means the entry is gone).
    pub current: u8,
}

impl DelegationChange {
    /// Whether the call left the delegation set exactly as it was.
    pub fn is_noop(&self) -> bool {
        self.previous == self.current
    }
}

/// Owns every account's outgoing delegation set and the reverse index.
#[derive(Clone, Debug, Default)]
pub struct DelegationRegistry {
    /// Delegator → ordered entries.
    delegations: HashMap<Account, Vec<Delegation>>,
    /// Delegatee → (delegator → percent).
    reverse_delegations: HashMap<Account, BTreeMap<Account, u8>>,
    limits: DelegationLimits,
}

impl DelegationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: DelegationLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Rebuild a registry from captured delegation sets.
    ///
    /// Every set is re-checked against the registry invariants before the
    /// reverse index is rebuilt from it.
    pub fn from_delegations(
        limits: DelegationLimits,
        sets: impl IntoIterator<Item = (Account, Vec<Delegation>)>,
    ) -> Result<Self, GovernanceError> {
        let mut registry = Self::with_limits(limits);
        for (delegator, entries) in sets {
            registry.check_set(&delegator, &entries)?;
            for entry in &entries {
                registry
                    .reverse_delegations
                    .entry(entry.delegatee)
                    .or_default()
                    .insert(delegator, entry.percent);
            }
            if !entries.is_empty() {
                registry.delegations.insert(delegator, entries);
            }
        }
        Ok(registry)
    }

    fn check_set(&self, delegator: &Account, entries: &[Delegation]) -> Result<(), GovernanceError> {
        if entries.len() > self.limits.max_delegatees {
            return Err(GovernanceError::InvalidDelegationSet(format!(
                "{delegator} has {} delegatees",
                entries.len()
            )));
        }
        let mut total = 0u32;
        for (i, entry) in entries.iter().enumerate() {
            if entry.delegatee == *delegator || entry.delegatee.is_zero() {
                return Err(GovernanceError::InvalidDelegationSet(format!(
                    "{delegator} delegates to {}",
                    entry.delegatee
                )));
            }
            if entry.percent == 0 || entry.percent > self.limits.max_percent {
                return Err(GovernanceError::InvalidDelegationSet(format!(
                    "{delegator} has a {}% entry",
                    entry.percent
                )));
            }
            if entries[..i].iter().any(|e| e.delegatee == entry.delegatee) {
                return Err(GovernanceError::InvalidDelegationSet(format!(
                    "{delegator} lists {} twice",
                    entry.delegatee
                )));
            }
            total += u32::from(entry.percent);
        }
        if total > u32::from(self.limits.max_percent) {
            return Err(GovernanceError::InvalidDelegationSet(format!(
                "{delegator} delegates {total}%"
            )));
        }
        Ok(())
    }

    /// Check a delegation without applying it.
    ///
    /// Structural checks (self, zero account, percent range) come first since
    /// they do not depend on existing state; the aggregate total and the
    /// delegatee count follow.
    pub fn validate(
        &self,
        delegator: &Account,
        delegatee: &Account,
        percent: u32,
    ) -> Result<DelegationChange, GovernanceError> {
        if delegatee == delegator {
            return Err(GovernanceError::SelfDelegation);
        }
        if delegatee.is_zero() {
            return Err(GovernanceError::ZeroDelegatee);
        }
        let percent = u8::try_from(percent)
            .ok()
            .filter(|p| *p <= self.limits.max_percent)
            .ok_or(GovernanceError::PercentOutOfRange { percent })?;

        let entries = self.delegations_of(delegator);
        let previous = entries
            .iter()
            .find(|e| e.delegatee == *delegatee)
            .map(|e| e.percent)
            .unwrap_or(0);

        let total = self.delegated_percent(delegator) - u32::from(previous) + u32::from(percent);
        if total > u32::from(self.limits.max_percent) {
            return Err(GovernanceError::TotalDelegationExceeded { total });
        }

        if previous == 0 && percent > 0 && entries.len() >= self.limits.max_delegatees {
            return Err(GovernanceError::MaxDelegateesExceeded {
                max: self.limits.max_delegatees,
            });
        }

        Ok(DelegationChange {
            delegator: *delegator,
            delegatee: *delegatee,
            previous,
            current: percent,
        })
    }

    /// Set `delegator`'s delegation to `delegatee` to `percent`.
    ///
    /// Replaces an existing entry for the same delegatee, adds a new one, or
    /// removes the entry when `percent` is zero.
    pub fn delegate(
        &mut self,
        delegator: &Account,
        delegatee: &Account,
        percent: u32,
    ) -> Result<DelegationChange, GovernanceError> {
        let change = self.validate(delegator, delegatee, percent)?;
        if !change.is_noop() {
            self.apply(&change);
        }
        Ok(change)
    }

    fn apply(&mut self, change: &DelegationChange) {
        let entries = self.delegations.entry(change.delegator).or_default();
        match entries.iter().position(|e| e.delegatee == change.delegatee) {
            Some(idx) if change.current == 0 => {
                entries.remove(idx);
            }
            Some(idx) => entries[idx].percent = change.current,
            None => entries.push(Delegation {
                delegatee: change.delegatee,
                percent: change.current,
            }),
        }
        if entries.is_empty() {
            self.delegations.remove(&change.delegator);
        }

        if change.current == 0 {
            if let Some(set) = self.reverse_delegations.get_mut(&change.delegatee) {
                set.remove(&change.delegator);
                if set.is_empty() {
                    self.reverse_delegations.remove(&change.delegatee);
                }
            }
        } else {
            self.reverse_delegations
                .entry(change.delegatee)
                .or_default()
                .insert(change.delegator, change.current);
        }
    }

    /// Outgoing entries of `delegator`, in the order they were first added.
    pub fn delegations_of(&self, delegator: &Account) -> &[Delegation] {
        self.delegations
            .get(delegator)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Sum of `delegator`'s outgoing percents.
    pub fn delegated_percent(&self, delegator: &Account) -> u32 {
        self.delegations_of(delegator)
            .iter()
            .map(|e| u32::from(e.percent))
            .sum()
    }

    /// Accounts delegating to `delegatee`, with their percent, ordered by account.
    pub fn delegators_of(&self, delegatee: &Account) -> impl Iterator<Item = (&Account, u8)> {
        self.reverse_delegations
            .get(delegatee)
            .into_iter()
            .flat_map(|set| set.iter().map(|(d, p)| (d, *p)))
    }

    /// Every non-empty delegation set.
    pub fn all_delegations(&self) -> impl Iterator<Item = (&Account, &[Delegation])> {
        self.delegations.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn limits(&self) -> DelegationLimits {
        self.limits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(n: u64) -> Account {
        Account::from_low_u64(n)
    }

    #[test]
    fn simple_delegation() {
        let mut registry = DelegationRegistry::new();
        let change = registry.delegate(&wallet(1), &wallet(2), 50).unwrap();
        assert_eq!(change.previous, 0);
        assert_eq!(change.current, 50);
        assert_eq!(
            registry.delegations_of(&wallet(1)),
            &[Delegation {
                delegatee: wallet(2),
                percent: 50
            }]
        );
        assert_eq!(registry.delegated_percent(&wallet(1)), 50);
        let delegators: Vec<_> = registry.delegators_of(&wallet(2)).collect();
        assert_eq!(delegators, vec![(&wallet(1), 50)]);
    }

    #[test]
    fn self_delegation_rejected() {
        let mut registry = DelegationRegistry::new();
        assert_eq!(
            registry.delegate(&wallet(1), &wallet(1), 1).unwrap_err(),
            GovernanceError::SelfDelegation
        );
    }

    #[test]
    fn self_delegation_checked_before_percent_range() {
        let registry = DelegationRegistry::new();
        assert_eq!(
            registry.validate(&wallet(1), &wallet(1), 200).unwrap_err(),
            GovernanceError::SelfDelegation
        );
    }

    #[test]
    fn percent_beyond_u8_is_out_of_range() {
        let registry = DelegationRegistry::new();
        assert_eq!(
            registry.validate(&wallet(1), &wallet(2), 256).unwrap_err(),
            GovernanceError::PercentOutOfRange { percent: 256 }
        );
        assert_eq!(
            registry.validate(&wallet(1), &wallet(2), u32::MAX).unwrap_err(),
            GovernanceError::PercentOutOfRange { percent: u32::MAX }
        );
        // structural checks still come first
        assert_eq!(
            registry.validate(&wallet(1), &wallet(1), 300).unwrap_err(),
            GovernanceError::SelfDelegation
        );
    }

    #[test]
    fn zero_delegatee_rejected() {
        let mut registry = DelegationRegistry::new();
        assert_eq!(
            registry.delegate(&wallet(1), &Account::ZERO, 10).unwrap_err(),
            GovernanceError::ZeroDelegatee
        );
    }

    #[test]
    fn over_100_percent_rejected() {
        let mut registry = DelegationRegistry::new();
        assert_eq!(
            registry.delegate(&wallet(1), &wallet(2), 111).unwrap_err(),
            GovernanceError::PercentOutOfRange { percent: 111 }
        );
    }

    #[test]
    fn changing_percent_replaces_entry() {
        let mut registry = DelegationRegistry::new();
        registry.delegate(&wallet(1), &wallet(2), 90).unwrap();
        let change = registry.delegate(&wallet(1), &wallet(2), 11).unwrap();
        assert_eq!(change.previous, 90);
        assert_eq!(registry.delegations_of(&wallet(1)).len(), 1);
        assert_eq!(registry.delegated_percent(&wallet(1)), 11);
        let delegators: Vec<_> = registry.delegators_of(&wallet(2)).collect();
        assert_eq!(delegators, vec![(&wallet(1), 11)]);
    }

    #[test]
    fn total_over_100_rejected() {
        let mut registry = DelegationRegistry::new();
        registry.delegate(&wallet(1), &wallet(2), 90).unwrap();
        assert_eq!(
            registry.delegate(&wallet(1), &wallet(3), 11).unwrap_err(),
            GovernanceError::TotalDelegationExceeded { total: 101 }
        );
        assert!(registry.delegators_of(&wallet(3)).next().is_none());
    }

    #[test]
    fn exactly_100_percent_is_allowed() {
        let mut registry = DelegationRegistry::new();
        registry.delegate(&wallet(1), &wallet(2), 60).unwrap();
        registry.delegate(&wallet(1), &wallet(3), 40).unwrap();
        assert_eq!(registry.delegated_percent(&wallet(1)), 100);
    }

    #[test]
    fn sixth_delegatee_rejected() {
        let mut registry = DelegationRegistry::new();
        for n in 2..=6 {
            registry.delegate(&wallet(1), &wallet(n), 1).unwrap();
        }
        assert_eq!(
            registry.delegate(&wallet(1), &wallet(7), 1).unwrap_err(),
            GovernanceError::MaxDelegateesExceeded { max: 5 }
        );
    }

    #[test]
    fn updating_existing_delegatee_at_capacity_succeeds() {
        let mut registry = DelegationRegistry::new();
        for n in 2..=6 {
            registry.delegate(&wallet(1), &wallet(n), 1).unwrap();
        }
        registry.delegate(&wallet(1), &wallet(4), 20).unwrap();
        assert_eq!(registry.delegated_percent(&wallet(1)), 24);
    }

    #[test]
    fn zero_percent_for_new_delegatee_at_capacity_is_noop() {
        let mut registry = DelegationRegistry::new();
        for n in 2..=6 {
            registry.delegate(&wallet(1), &wallet(n), 1).unwrap();
        }
        let change = registry.delegate(&wallet(1), &wallet(7), 0).unwrap();
        assert!(change.is_noop());
        assert_eq!(registry.delegations_of(&wallet(1)).len(), 5);
    }

    #[test]
    fn total_checked_before_count() {
        let mut registry = DelegationRegistry::new();
        for n in 2..=6 {
            registry.delegate(&wallet(1), &wallet(n), 20).unwrap();
        }
        assert_eq!(
            registry.delegate(&wallet(1), &wallet(7), 1).unwrap_err(),
            GovernanceError::TotalDelegationExceeded { total: 101 }
        );
    }

    #[test]
    fn zero_percent_removes_entry_and_reverse_index() {
        let mut registry = DelegationRegistry::new();
        registry.delegate(&wallet(1), &wallet(2), 20).unwrap();
        registry.delegate(&wallet(1), &wallet(3), 30).unwrap();
        registry.delegate(&wallet(1), &wallet(2), 0).unwrap();

        assert_eq!(
            registry.delegations_of(&wallet(1)),
            &[Delegation {
                delegatee: wallet(3),
                percent: 30
            }]
        );
        assert!(registry.delegators_of(&wallet(2)).next().is_none());

        registry.delegate(&wallet(1), &wallet(3), 0).unwrap();
        assert!(registry.delegations_of(&wallet(1)).is_empty());
        assert_eq!(registry.all_delegations().count(), 0);
    }

    #[test]
    fn removal_preserves_order_of_remaining_entries() {
        let mut registry = DelegationRegistry::new();
        for n in 2..=5 {
            registry.delegate(&wallet(1), &wallet(n), 10).unwrap();
        }
        registry.delegate(&wallet(1), &wallet(3), 0).unwrap();
        let order: Vec<Account> = registry
            .delegations_of(&wallet(1))
            .iter()
            .map(|d| d.delegatee)
            .collect();
        assert_eq!(order, vec![wallet(2), wallet(4), wallet(5)]);
    }

    #[test]
    fn fan_in_reverse_index() {
        let mut registry = DelegationRegistry::new();
        for n in 2..=4 {
            registry.delegate(&wallet(n), &wallet(1), 10 * n as u32).unwrap();
        }
        let delegators: Vec<_> = registry.delegators_of(&wallet(1)).collect();
        assert_eq!(
            delegators,
            vec![(&wallet(2), 20), (&wallet(3), 30), (&wallet(4), 40)]
        );
    }

    #[test]
    fn custom_limits_are_enforced() {
        let mut registry = DelegationRegistry::with_limits(DelegationLimits {
            max_delegatees: 2,
            max_percent: 100,
        });
        registry.delegate(&wallet(1), &wallet(2), 1).unwrap();
        registry.delegate(&wallet(1), &wallet(3), 1).unwrap();
        assert_eq!(
            registry.delegate(&wallet(1), &wallet(4), 1).unwrap_err(),
            GovernanceError::MaxDelegateesExceeded { max: 2 }
        );
    }

    #[test]
    fn from_delegations_rebuilds_reverse_index() {
        let sets = vec![
            (
                wallet(1),
                vec![Delegation {
                    delegatee: wallet(3),
                    percent: 40,
                }],
            ),
            (
                wallet(2),
                vec![Delegation {
                    delegatee: wallet(3),
                    percent: 10,
                }],
            ),
        ];
        let registry = DelegationRegistry::from_delegations(DelegationLimits::default(), sets).unwrap();
        let delegators: Vec<_> = registry.delegators_of(&wallet(3)).collect();
        assert_eq!(delegators, vec![(&wallet(1), 40), (&wallet(2), 10)]);
    }

    #[test]
    fn from_delegations_rejects_broken_sets() {
        let over = vec![(
            wallet(1),
            vec![
                Delegation {
                    delegatee: wallet(2),
                    percent: 70,
                },
                Delegation {
                    delegatee: wallet(3),
                    percent: 40,
                },
            ],
        )];
        assert!(matches!(
            DelegationRegistry::from_delegations(DelegationLimits::default(), over),
            Err(GovernanceError::InvalidDelegationSet(_))
        ));

        let duplicate = vec![(
            wallet(1),
            vec![
                Delegation {
                    delegatee: wallet(2),
                    percent: 10,
                },
                Delegation {
                    delegatee: wallet(2),
                    percent: 10,
                },
            ],
        )];
        assert!(DelegationRegistry::from_delegations(DelegationLimits::default(), duplicate).is_err());

        let to_self = vec![(
            wallet(1),
            vec![Delegation {
                delegatee: wallet(1),
                percent: 10,
            }],
        )];
        assert!(DelegationRegistry::from_delegations(DelegationLimits::default(), to_self).is_err());
    }
}
