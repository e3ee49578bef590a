//! Line-oriented replay scripts.
//!
//! A script holds one JSON command per line. Every state-changing command is
//! mined in its own block; `mine` advances the chain by empty blocks so that
//! earlier heights become queryable history. Blank lines and lines starting
//! with `#` are skipped.

use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use tally_nullables::NullChain;
use tally_token::{Account, BlockHeight, Delegation, Genesis, Token, TokenError};

/// One script command.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case", deny_unknown_fields)]
pub enum Command {
    Mine {
        #[serde(default = "one_block")]
        blocks: u64,
    },
    Transfer {
        from: Account,
        to: Account,
        amount: u128,
    },
    Delegate {
        delegator: Account,
        delegatee: Account,
        percent: u32,
    },
    Balance {
        account: Account,
        #[serde(default)]
        at: Option<u64>,
    },
    VotePower {
        account: Account,
        #[serde(default)]
        at: Option<u64>,
    },
    Delegations {
        account: Account,
    },
}

fn one_block() -> u64 {
    1
}

/// Result of one successful command, printed as a single JSON object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Output {
    Mined {
        block: u64,
    },
    Transferred {
        block: u64,
        from_balance: u128,
        to_balance: u128,
    },
    Delegated {
        block: u64,
        previous: u8,
        percent: u8,
    },
    Balance {
        account: Account,
        block: u64,
        balance: u128,
    },
    VotePower {
        account: Account,
        block: u64,
        vote_power: u128,
        retained: Option<u128>,
        incoming: Option<u128>,
    },
    Delegations {
        account: Account,
        delegated_percent: u32,
        delegations: Vec<Delegation>,
    },
}

#[derive(Serialize)]
struct Failure<'a> {
    line: usize,
    error: String,
    kind: &'a str,
}

/// Counts reported at the end of a replay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub executed: usize,
    pub failed: usize,
}

/// A token driven by a deterministic block clock.
pub struct Replay {
    chain: NullChain,
    token: Token,
}

impl Replay {
    /// Deploy a token at the genesis height.
    pub fn new(genesis: &Genesis) -> Result<Self, TokenError> {
        let chain = NullChain::new(genesis.height.as_u64());
        let token = Token::new(genesis)?;
        Ok(Self { chain, token })
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn height(&self) -> BlockHeight {
        self.chain.height()
    }

    /// Execute a single command.
    pub fn execute(&mut self, command: Command) -> Result<Output, TokenError> {
        let now = self.chain.height();
        match command {
            Command::Mine { blocks } => {
                self.chain.mine(blocks);
                Ok(Output::Mined {
                    block: self.chain.height().as_u64(),
                })
            }
            Command::Transfer { from, to, amount } => {
                // a reverted call still consumes its block
                let block = self.chain.next_block();
                let outcome = self.token.transfer(&from, &to, amount, block)?;
                Ok(Output::Transferred {
                    block: block.as_u64(),
                    from_balance: outcome.from_balance,
                    to_balance: outcome.to_balance,
                })
            }
            Command::Delegate {
                delegator,
                delegatee,
                percent,
            } => {
                let block = self.chain.next_block();
                let change = self.token.delegate(&delegator, &delegatee, percent, block)?;
                Ok(Output::Delegated {
                    block: block.as_u64(),
                    previous: change.previous,
                    percent: change.current,
                })
            }
            Command::Balance { account, at } => {
                let (block, balance) = match at {
                    Some(v) => (v, self.token.balance_of_at(&account, BlockHeight::new(v), now)?),
                    None => (now.as_u64(), self.token.balance_of(&account)),
                };
                Ok(Output::Balance {
                    account,
                    block,
                    balance,
                })
            }
            Command::VotePower { account, at } => match at {
                Some(v) => Ok(Output::VotePower {
                    account,
                    block: v,
                    vote_power: self
                        .token
                        .vote_power_of_at(&account, BlockHeight::new(v), now)?,
                    retained: None,
                    incoming: None,
                }),
                None => {
                    let power = self.token.vote_power_breakdown(&account);
                    Ok(Output::VotePower {
                        account,
                        block: now.as_u64(),
                        vote_power: self.token.vote_power_of(&account),
                        retained: Some(power.retained),
                        incoming: Some(power.incoming),
                    })
                }
            },
            Command::Delegations { account } => Ok(Output::Delegations {
                account,
                delegated_percent: self.token.delegated_percent(&account),
                delegations: self.token.delegations_of(&account).to_vec(),
            }),
        }
    }

    /// Execute every command in `input`, writing one JSON line per command
    /// to `out`. Failed commands are reported and the replay continues.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> anyhow::Result<ReplaySummary> {
        let mut summary = ReplaySummary::default();
        for (index, line) in input.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let line_no = index + 1;

            let result = match serde_json::from_str::<Command>(trimmed) {
                Ok(command) => self.execute(command).map_err(|e| {
                    let kind = format!("{:?}", e.kind());
                    (e.to_string(), kind)
                }),
                Err(e) => Err((e.to_string(), "Parse".to_string())),
            };

            match result {
                Ok(output) => {
                    serde_json::to_writer(&mut out, &output)?;
                }
                Err((error, kind)) => {
                    tracing::debug!(line = line_no, %error, "script command failed");
                    summary.failed += 1;
                    serde_json::to_writer(
                        &mut out,
                        &Failure {
                            line: line_no,
                            error,
                            kind: &kind,
                        },
                    )?;
                }
            }
            writeln!(out)?;
            summary.executed += 1;
        }
        out.flush()?;
        Ok(summary)
    }
}
