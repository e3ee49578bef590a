//! Snapshot inspection.

use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use tally_token::{Token, TokenSnapshot};

/// Summary printed by `tally inspect`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SnapshotReport {
    pub version: u32,
    pub hash: String,
    pub verified: bool,
    pub restorable: bool,
    pub height: u64,
    pub total_supply: u128,
    pub accounts: usize,
    pub checkpoints: usize,
    pub delegators: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn inspect(path: &Path) -> anyhow::Result<SnapshotReport> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let snapshot = TokenSnapshot::from_bytes(&bytes)
        .with_context(|| format!("failed to decode snapshot {}", path.display()))?;

    let mut report = SnapshotReport {
        version: snapshot.version,
        hash: hex::encode(snapshot.hash),
        verified: snapshot.verify(),
        restorable: false,
        height: snapshot.height.as_u64(),
        total_supply: snapshot.total_supply,
        accounts: snapshot.account_count(),
        checkpoints: snapshot.checkpoint_count(),
        delegators: snapshot.delegations.len(),
        error: None,
    };
    match Token::restore(snapshot) {
        Ok(_) => report.restorable = true,
        Err(e) => report.error = Some(e.to_string()),
    }
    Ok(report)
}
