//! tally: replay transfer and delegation scripts against a checkpointed
//! token and inspect the snapshots they produce.

mod inspect;
mod script;

use anyhow::Context;
use clap::Parser;
use std::io::{BufReader, Write};
use std::path::PathBuf;
use tally_token::TokenConfig;
use tally_utils::LogFormat;

#[derive(Parser)]
#[command(name = "tally", about = "Checkpointed token ledger with partial delegation")]
struct Cli {
    /// Log level: "trace", "debug", "info", "warn", "error".
    /// Defaults to the config file's value, or "warn" without one.
    #[arg(long, env = "TALLY_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "TALLY_LOG_FORMAT", global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Replay a script of JSON commands, one per line.
    Run {
        /// Path to the TOML configuration file.
        #[arg(long, env = "TALLY_CONFIG")]
        config: PathBuf,

        /// Script to replay; "-" reads standard input.
        script: PathBuf,

        /// Write a snapshot of the final state to this file.
        #[arg(long, env = "TALLY_SNAPSHOT_OUT")]
        snapshot_out: Option<PathBuf>,
    },
    /// Verify and summarise a snapshot file.
    Inspect {
        snapshot: PathBuf,
    },
}

fn init_logging(cli: &Cli, config: Option<&TokenConfig>) -> anyhow::Result<()> {
    let format = match (cli.log_format, config) {
        (Some(format), _) => format,
        (None, Some(config)) => config
            .log_format
            .parse::<LogFormat>()
            .map_err(anyhow::Error::msg)?,
        (None, None) => LogFormat::Human,
    };
    let level = cli
        .log_level
        .clone()
        .or_else(|| config.map(|c| c.log_level.clone()))
        .unwrap_or_else(|| "warn".to_string());
    tally_utils::init_logging(format, &level);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Command::Run {
            config,
            script,
            snapshot_out,
        } => {
            let token_config = TokenConfig::from_toml_file(config)
                .with_context(|| format!("failed to load config {}", config.display()))?;
            init_logging(&cli, Some(&token_config))?;

            let genesis = token_config.genesis();
            tracing::info!(
                config = %config.display(),
                owner = %genesis.owner,
                supply = genesis.total_supply,
                "starting replay"
            );
            let mut replay = script::Replay::new(&genesis)?;

            let stdout = std::io::stdout();
            let summary = if script.as_os_str() == "-" {
                replay.run(std::io::stdin().lock(), stdout.lock())?
            } else {
                let file = std::fs::File::open(script)
                    .with_context(|| format!("failed to open script {}", script.display()))?;
                replay.run(BufReader::new(file), stdout.lock())?
            };
            tracing::info!(
                executed = summary.executed,
                failed = summary.failed,
                height = %replay.height(),
                "replay finished"
            );

            if let Some(path) = snapshot_out {
                let snapshot = replay.token().snapshot();
                std::fs::write(path, snapshot.to_bytes()?)
                    .with_context(|| format!("failed to write snapshot {}", path.display()))?;
                tracing::info!(
                    path = %path.display(),
                    accounts = snapshot.account_count(),
                    "snapshot written"
                );
            }
        }
        Command::Inspect { snapshot } => {
            init_logging(&cli, None)?;
            let report = inspect::inspect(snapshot)?;
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &report)?;
            writeln!(stdout)?;
            if !report.restorable {
                anyhow::bail!("snapshot {} is not usable", snapshot.display());
            }
        }
    }

    Ok(())
}
