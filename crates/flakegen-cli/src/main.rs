#![doc = include_str!("../README.md")]

mod config;
mod telemetry;

use anyhow::{Context, bail};
use clap::Parser;
use config::{CliArgs, Command, GeneratorConfig};
use flakegen::{BasicSnowflakeGenerator, MonotonicClock, SnowflakeParts};
use std::io::{BufWriter, Write};
use telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    init_telemetry()?;

    let config = GeneratorConfig::try_from(&args)?;
    let generator = build_generator(&config)?;

    if cfg!(debug_assertions) {
        tracing::debug!("Running {:?} with config: {:#?}", args.command, config);
    }

    match args.command {
        Command::Generate {
            count, print_state, ..
        } => {
            let ids = generator.next_ids(count)?;
            let mut out = BufWriter::new(std::io::stdout().lock());
            for id in &ids {
                writeln!(out, "{id}")?;
            }
            out.flush()?;
            tracing::info!(count, stats = ?generator.statistics()?, "minted ids");
            if print_state {
                eprintln!("{}", generator.serialize()?);
            }
        }
        Command::Parse { id } => {
            let SnowflakeParts {
                timestamp,
                datacenter_id,
                worker_id,
                sequence,
            } = generator.parse(id)?;
            println!(
                "timestamp={timestamp} datacenter_id={datacenter_id} worker_id={worker_id} sequence={sequence}"
            );
        }
        Command::Validate { id } => {
            if !generator.validate(id)? {
                bail!(
                    "id {id} does not belong to worker {} in datacenter {}",
                    config.worker_id,
                    config.datacenter_id
                );
            }
            println!("valid");
        }
    }

    Ok(())
}

fn build_generator(
    config: &GeneratorConfig,
) -> anyhow::Result<BasicSnowflakeGenerator<MonotonicClock>> {
    let clock = MonotonicClock::new();
    let generator = match (config.resume, config.secret_key) {
        (Some(state), _) => BasicSnowflakeGenerator::from_state(config.epoch, state, clock)
            .context("failed to restore generator")?,
        (None, Some(key)) => BasicSnowflakeGenerator::with_secret_key(
            config.epoch,
            config.worker_id,
            config.datacenter_id,
            key,
            clock,
        )
        .context("failed to build generator")?,
        (None, None) => BasicSnowflakeGenerator::new(
            config.epoch,
            config.worker_id,
            config.datacenter_id,
            clock,
        )
        .context("failed to build generator")?,
    };
    Ok(generator)
}
