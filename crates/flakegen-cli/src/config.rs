use core::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use flakegen::{ATOM_EPOCH, GeneratorState, SecretKey, check_identity};

/// Runtime configuration for the `flakegen` binary.
///
/// Identity and key settings are global and may come from CLI flags or
/// environment variables (a `.env` file is loaded first).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flakegen",
    version,
    about = "Mint, decode and validate Snowflake-style IDs"
)]
pub struct CliArgs {
    /// Worker ID encoded into minted IDs (0-31).
    ///
    /// Environment variable: `FLAKEGEN_WORKER_ID`
    #[arg(long, global = true, env = "FLAKEGEN_WORKER_ID", default_value_t = 0)]
    pub worker_id: u64,

    /// Datacenter ID encoded into minted IDs (0-31).
    ///
    /// Environment variable: `FLAKEGEN_DATACENTER_ID`
    #[arg(long, global = true, env = "FLAKEGEN_DATACENTER_ID", default_value_t = 0)]
    pub datacenter_id: u64,

    /// Epoch in milliseconds since the Unix epoch. Defaults to 2021-01-01 UTC.
    ///
    /// Environment variable: `FLAKEGEN_EPOCH_MS`
    #[arg(long, global = true, env = "FLAKEGEN_EPOCH_MS", default_value_t = ATOM_EPOCH.as_millis() as u64)]
    pub epoch_ms: u64,

    /// Obfuscation key. A random one is drawn when omitted, which only makes
    /// sense for `generate`.
    ///
    /// Environment variable: `FLAKEGEN_SECRET_KEY`
    #[arg(long, global = true, env = "FLAKEGEN_SECRET_KEY")]
    pub secret_key: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Mint IDs, one per line.
    Generate {
        /// Number of IDs, minted as one batch.
        #[arg(short, long, default_value_t = 1)]
        count: usize,

        /// Serialized state (`worker:datacenter:sequence:last_timestamp:key`)
        /// to continue from. Overrides the identity and key flags.
        #[arg(long)]
        resume: Option<String>,

        /// Print the generator state to stderr once done.
        #[arg(long, default_value_t = false)]
        print_state: bool,
    },
    /// Decode an ID into its fields.
    Parse { id: u64 },
    /// Exit non-zero unless the ID belongs to the configured identity and key.
    Validate { id: u64 },
}

/// Validated generator settings.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub epoch: Duration,
    pub worker_id: u64,
    pub datacenter_id: u64,
    pub secret_key: Option<SecretKey>,
    pub resume: Option<GeneratorState>,
}

impl TryFrom<&CliArgs> for GeneratorConfig {
    type Error = anyhow::Error;

    fn try_from(args: &CliArgs) -> Result<Self, Self::Error> {
        check_identity(args.worker_id, args.datacenter_id)
            .context("invalid FLAKEGEN_WORKER_ID / FLAKEGEN_DATACENTER_ID")?;

        let needs_key = matches!(args.command, Command::Parse { .. } | Command::Validate { .. });
        if needs_key && args.secret_key.is_none() {
            bail!("FLAKEGEN_SECRET_KEY is required to decode or validate IDs");
        }

        let resume = match &args.command {
            Command::Generate {
                resume: Some(text), ..
            } => Some(
                text.parse::<GeneratorState>()
                    .context("invalid --resume state")?,
            ),
            _ => None,
        };

        Ok(Self {
            epoch: Duration::from_millis(args.epoch_ms),
            worker_id: args.worker_id,
            datacenter_id: args.datacenter_id,
            secret_key: args.secret_key.map(SecretKey::new),
            resume,
        })
    }
}
