//! Token configuration with TOML file support.

use crate::error::TokenError;
use serde::{Deserialize, Serialize};
use tally_ledger::Genesis;
use tally_types::{Account, BlockHeight};

/// Genesis section of the configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenesisConfig {
    /// Account credited with the whole supply.
    pub owner: Account,

    /// Total supply in raw units.
    #[serde(default = "default_total_supply")]
    pub total_supply: u64,

    /// Block height at which the supply is minted.
    #[serde(default)]
    pub height: u64,
}

/// Configuration for a token instance.
///
/// Can be loaded from a TOML file via [`TokenConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    pub genesis: GenesisConfig,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_total_supply() -> u64 {
    500
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl TokenConfig {
    /// A configuration with default settings for the given owner.
    pub fn for_owner(owner: Account) -> Self {
        Self {
            genesis: GenesisConfig {
                owner,
                total_supply: default_total_supply(),
                height: 0,
            },
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self, TokenError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| TokenError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, TokenError> {
        toml::from_str(s).map_err(|e| TokenError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, TokenError> {
        toml::to_string_pretty(self).map_err(|e| TokenError::Config(e.to_string()))
    }

    /// The genesis mint described by this configuration.
    pub fn genesis(&self) -> Genesis {
        Genesis::new(
            self.genesis.owner,
            u128::from(self.genesis.total_supply),
            BlockHeight::new(self.genesis.height),
        )
    }
}
