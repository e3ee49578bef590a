//! Token snapshots: every timeline and delegation set at a height.
//!
//! A snapshot holds complete histories, not just live values, so a restored
//! token answers historical queries exactly like the token it was taken from.
//! The hash is computed over a canonical, account-sorted encoding so two
//! tokens with the same state always produce the same snapshot hash.

use crate::error::TokenError;
use crate::token::Token;
use serde::{Deserialize, Serialize};
use tally_governance::{Delegation, DelegationLimits, DelegationRegistry, VotePowerEngine};
use tally_ledger::BalanceLedger;
use tally_store::Timeline;
use tally_types::{Account, BlockHeight, Checkpoint};

/// Snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// One account's checkpoints for a single quantity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountHistory {
    pub account: Account,
    pub checkpoints: Vec<Checkpoint>,
}

/// One account's outgoing delegations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationSet {
    pub delegator: Account,
    pub entries: Vec<Delegation>,
}

/// Full state of a token at `height`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenSnapshot {
    /// Blake2b-256 of the canonical encoding of the fields below.
    pub hash: [u8; 32],
    /// Height of the last state change included.
    pub height: BlockHeight,
    pub total_supply: u128,
    pub limits: DelegationLimits,
    /// Balance histories, sorted by account.
    pub balances: Vec<AccountHistory>,
    /// Vote-power histories, sorted by account.
    pub vote_powers: Vec<AccountHistory>,
    /// Delegation sets, sorted by delegator.
    pub delegations: Vec<DelegationSet>,
    /// Snapshot version for compatibility.
    pub version: u32,
}

fn histories<'a>(timelines: impl Iterator<Item = (&'a Account, &'a Timeline)>) -> Vec<AccountHistory> {
    let mut out: Vec<AccountHistory> = timelines
        .map(|(account, timeline)| AccountHistory {
            account: *account,
            checkpoints: timeline.checkpoints().to_vec(),
        })
        .collect();
    out.sort_by_key(|h| h.account);
    out
}

/// Rebuild timelines, rejecting any checkpoint recorded after `height`.
fn timelines(
    histories: Vec<AccountHistory>,
    height: BlockHeight,
) -> Result<Vec<(Account, Timeline)>, TokenError> {
    histories
        .into_iter()
        .map(|h| {
            if let Some(cp) = h.checkpoints.iter().find(|cp| cp.height > height) {
                return Err(TokenError::Snapshot(format!(
                    "checkpoint of {} at {} is past the snapshot height {height}",
                    h.account, cp.height
                )));
            }
            Timeline::from_checkpoints(h.checkpoints)
                .map(|t| (h.account, t))
                .ok_or_else(|| {
                    TokenError::Snapshot(format!("checkpoints of {} are out of order", h.account))
                })
        })
        .collect()
}

impl TokenSnapshot {
    /// Capture the full state of `token`.
    pub fn create(token: &Token) -> Self {
        let mut delegations: Vec<DelegationSet> = token
            .registry
            .all_delegations()
            .map(|(delegator, entries)| DelegationSet {
                delegator: *delegator,
                entries: entries.to_vec(),
            })
            .collect();
        delegations.sort_by_key(|d| d.delegator);

        let mut snap = Self {
            hash: [0u8; 32],
            height: token.height,
            total_supply: token.total_supply(),
            limits: token.limits(),
            balances: histories(token.ledger.timelines()),
            vote_powers: histories(token.engine.timelines()),
            delegations,
            version: SNAPSHOT_VERSION,
        };
        snap.hash = snap.compute_hash();
        snap
    }

    /// Compute the Blake2b-256 hash of this snapshot deterministically.
    fn compute_hash(&self) -> [u8; 32] {
        use blake2::digest::consts::U32;
        use blake2::{Blake2b, Digest};

        let mut hasher = Blake2b::<U32>::new();
        hasher.update(self.version.to_le_bytes());
        hasher.update(self.height.as_u64().to_le_bytes());
        hasher.update(self.total_supply.to_le_bytes());
        hasher.update((self.limits.max_delegatees as u64).to_le_bytes());
        hasher.update([self.limits.max_percent]);
        for section in [&self.balances, &self.vote_powers] {
            hasher.update((section.len() as u64).to_le_bytes());
            for history in section {
                hasher.update(history.account.as_bytes());
                hasher.update((history.checkpoints.len() as u64).to_le_bytes());
                for cp in &history.checkpoints {
                    hasher.update(cp.height.as_u64().to_le_bytes());
                    hasher.update(cp.value.to_le_bytes());
                }
            }
        }
        hasher.update((self.delegations.len() as u64).to_le_bytes());
        for set in &self.delegations {
            hasher.update(set.delegator.as_bytes());
            hasher.update((set.entries.len() as u64).to_le_bytes());
            for entry in &set.entries {
                hasher.update(entry.delegatee.as_bytes());
                hasher.update([entry.percent]);
            }
        }

        let result = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&result);
        out
    }

    /// Verify the snapshot hash matches its contents.
    pub fn verify(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Serialize the snapshot to bytes (bincode).
    pub fn to_bytes(&self) -> Result<Vec<u8>, TokenError> {
        bincode::serialize(self).map_err(|e| TokenError::Snapshot(e.to_string()))
    }

    /// Deserialize a snapshot from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TokenError> {
        bincode::deserialize(bytes).map_err(|e| TokenError::Snapshot(e.to_string()))
    }

    /// Number of accounts with a balance history.
    pub fn account_count(&self) -> usize {
        self.balances.len()
    }

    /// Number of checkpoints across balances and vote power.
    pub fn checkpoint_count(&self) -> usize {
        self.balances
            .iter()
            .chain(&self.vote_powers)
            .map(|h| h.checkpoints.len())
            .sum()
    }
}

impl Token {
    /// Capture the full state of this token.
    pub fn snapshot(&self) -> TokenSnapshot {
        TokenSnapshot::create(self)
    }

    /// Rebuild a token from a snapshot.
    ///
    /// Rejects snapshots with a mismatched hash or version, malformed
    /// timelines or checkpoints past the snapshot height, delegation sets
    /// that break the registry invariants, live vote power that disagrees
    /// with balances and delegations, or state that does not conserve the
    /// supply.
    pub fn restore(snapshot: TokenSnapshot) -> Result<Self, TokenError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(TokenError::Snapshot(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        if !snapshot.verify() {
            return Err(TokenError::Snapshot("hash mismatch".into()));
        }

        let height = snapshot.height;
        let ledger = BalanceLedger::from_timelines(
            snapshot.total_supply,
            timelines(snapshot.balances, height)?,
        );
        let engine = VotePowerEngine::from_timelines(timelines(snapshot.vote_powers, height)?);
        let registry = DelegationRegistry::from_delegations(
            snapshot.limits,
            snapshot
                .delegations
                .into_iter()
                .map(|set| (set.delegator, set.entries)),
        )?;

        let token = Self {
            ledger,
            registry,
            engine,
            height,
        };
        for account in token.accounts() {
            let stored = token.vote_power_of(&account);
            let derived = token.vote_power_breakdown(&account).total();
            if stored != derived {
                return Err(TokenError::Snapshot(format!(
                    "vote power of {account} is {stored}, balances and delegations give {derived}"
                )));
            }
        }
        token.check_conservation(height, height)?;
        tracing::info!(
            height = %token.height,
            accounts = token.accounts().len(),
            "token restored from snapshot"
        );
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_ledger::Genesis;

    fn wallet(n: u64) -> Account {
        Account::from_low_u64(n)
    }

    fn h(n: u64) -> BlockHeight {
        BlockHeight::new(n)
    }

    fn sample_token() -> Token {
        let mut token = Token::new(&Genesis::new(wallet(1), 1_000, h(0))).unwrap();
        token.transfer(&wallet(1), &wallet(2), 300, h(1)).unwrap();
        token.delegate(&wallet(1), &wallet(3), 25, h(2)).unwrap();
        token.delegate(&wallet(2), &wallet(3), 50, h(2)).unwrap();
        token.transfer(&wallet(2), &wallet(4), 100, h(3)).unwrap();
        token
    }

    #[test]
    fn snapshot_hash_verifies() {
        let snap = sample_token().snapshot();
        assert!(snap.verify());
        assert_eq!(snap.version, SNAPSHOT_VERSION);
        assert_eq!(snap.height, h(3));
        assert_eq!(snap.account_count(), 3);
    }

    #[test]
    fn tampered_snapshot_fails_verification() {
        let mut snap = sample_token().snapshot();
        snap.total_supply += 1;
        assert!(!snap.verify());
        assert!(matches!(Token::restore(snap), Err(TokenError::Snapshot(_))));
    }

    #[test]
    fn snapshot_is_deterministic() {
        assert_eq!(sample_token().snapshot().hash, sample_token().snapshot().hash);
    }

    #[test]
    fn restore_answers_historical_queries() {
        let source = sample_token();
        let bytes = source.snapshot().to_bytes().unwrap();
        let restored = Token::restore(TokenSnapshot::from_bytes(&bytes).unwrap()).unwrap();

        assert_eq!(restored.height(), source.height());
        for account in source.accounts() {
            for v in 0..=3 {
                assert_eq!(
                    restored.balance_of_at(&account, h(v), h(3)).unwrap(),
                    source.balance_of_at(&account, h(v), h(3)).unwrap()
                );
                assert_eq!(
                    restored.vote_power_of_at(&account, h(v), h(3)).unwrap(),
                    source.vote_power_of_at(&account, h(v), h(3)).unwrap()
                );
            }
        }
        assert_eq!(restored.delegators_of(&wallet(3)), source.delegators_of(&wallet(3)));
    }

    #[test]
    fn restored_token_keeps_working() {
        let mut restored = Token::restore(sample_token().snapshot()).unwrap();
        restored.transfer(&wallet(1), &wallet(5), 100, h(4)).unwrap();
        // wallet 1: 600 → 25% of 600 = 150 out, 450 retained
        assert_eq!(restored.vote_power_of(&wallet(1)), 450);
        // wallet 3: 150 from wallet 1 + 50% of wallet 2's 200 = 100
        assert_eq!(restored.vote_power_of(&wallet(3)), 250);
        restored.check_conservation(h(4), h(4)).unwrap();
    }

    /// Re-seal a hand-edited snapshot so only the content checks can catch it.
    fn reseal(mut snap: TokenSnapshot) -> TokenSnapshot {
        snap.hash = snap.compute_hash();
        snap
    }

    #[test]
    fn checkpoint_past_snapshot_height_is_rejected() {
        let token = Token::new(&Genesis::new(wallet(1), 100, h(0))).unwrap();
        let mut snap = token.snapshot();
        snap.balances.push(AccountHistory {
            account: wallet(2),
            checkpoints: vec![Checkpoint::new(h(10), 0)],
        });
        let err = Token::restore(reseal(snap)).unwrap_err();
        assert!(matches!(err, TokenError::Snapshot(ref m) if m.contains("past the snapshot height")));

        let mut snap = sample_token().snapshot();
        snap.vote_powers[0].checkpoints.push(Checkpoint::new(h(4), 0));
        assert!(matches!(
            Token::restore(reseal(snap)),
            Err(TokenError::Snapshot(_))
        ));
    }

    #[test]
    fn restored_genesis_transfers_to_new_account() {
        let token = Token::new(&Genesis::new(wallet(1), 100, h(0))).unwrap();
        let mut restored = Token::restore(token.snapshot()).unwrap();
        restored.transfer(&wallet(1), &wallet(2), 50, h(1)).unwrap();
        assert_eq!(restored.balance_of(&wallet(1)), 50);
        assert_eq!(restored.balance_of(&wallet(2)), 50);
        restored.check_conservation(h(1), h(1)).unwrap();
    }

    #[test]
    fn tampered_vote_power_view_is_rejected() {
        let mut token = Token::new(&Genesis::new(wallet(1), 500, h(0))).unwrap();
        token.delegate(&wallet(1), &wallet(2), 50, h(1)).unwrap();
        let mut snap = token.snapshot();
        for history in &mut snap.vote_powers {
            let value = if history.account == wallet(1) { 400 } else { 100 };
            history.checkpoints.last_mut().unwrap().value = value;
        }
        // still sums to the supply, but disagrees with 250/250
        let err = Token::restore(reseal(snap)).unwrap_err();
        assert!(matches!(err, TokenError::Snapshot(ref m) if m.contains("vote power of")));
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(matches!(
            TokenSnapshot::from_bytes(&[1, 2, 3]),
            Err(TokenError::Snapshot(_))
        ));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let mut snap = sample_token().snapshot();
        snap.version = 99;
        snap.hash = snap.compute_hash();
        assert!(matches!(Token::restore(snap), Err(TokenError::Snapshot(_))));
    }
}
