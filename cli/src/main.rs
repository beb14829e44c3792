// Copyright (c) 2026 Sigil Systems. MIT License.
// See LICENSE for details.

//! # SIGIL CLI
//!
//! Entry point for the `sigil` binary: a thin front-end over
//! `sigil-ledger`. Every invariant lives in the library; this binary only
//! parses arguments, wires up the service, and renders results.
//!
//! Subcommands:
//!
//! - `add`     — append a record and save the ledger
//! - `list`    — display every block
//! - `verify`  — run both integrity checks
//! - `watch`   — run the background monitor until Ctrl-C
//! - `version` — print build version information

mod cli;
mod logging;

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;

use sigil_ledger::config::{DEFAULT_KEY_FILE, DEFAULT_LEDGER_FILE};
use sigil_ledger::keys::FileKeyProvider;
use sigil_ledger::monitor::MonitorConfig;
use sigil_ledger::service::LedgerService;
use sigil_ledger::storage::{Block, Codec, LedgerStore};

use cli::{Commands, SigilCli};
use logging::LogFormat;

#[tokio::main]
async fn main() -> Result<()> {
    let args = SigilCli::parse();

    let format = LogFormat::from_str_lossy(
        &std::env::var("SIGIL_LOG_FORMAT").unwrap_or_default(),
    );
    logging::init_logging("sigil=info,sigil_ledger=info", format);

    match args.command {
        Commands::Add(args) => add(args),
        Commands::List(args) => list(args),
        Commands::Verify(args) => verify(args),
        Commands::Watch(args) => watch(args).await,
        Commands::Version => {
            println!("sigil {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Open the ledger service over the given data directory, provisioning the
/// key file on first use.
fn open_service(data_dir: &Path) -> Result<LedgerService> {
    tracing::info!(data_dir = %data_dir.display(), "opening ledger");
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

    let key_provider = FileKeyProvider::new(data_dir.join(DEFAULT_KEY_FILE));
    let codec = Codec::from_provider(&key_provider).context("failed to provision ledger key")?;
    let store = LedgerStore::new(data_dir.join(DEFAULT_LEDGER_FILE), codec);
    Ok(LedgerService::open(store))
}

fn add(args: cli::AddArgs) -> Result<()> {
    let service = open_service(&args.dir.data_dir)?;

    let summary = service
        .add_block(args.data)
        .context("failed to append block")?;
    println!("appended block #{} ({})", summary.index, summary.hash);

    if !summary.chain_verified {
        bail!("chain verification failed after append; ledger NOT saved");
    }
    if args.no_save {
        println!("--no-save given; the block is not persisted");
        return Ok(());
    }

    service.save().context("failed to save ledger")?;
    println!("ledger saved ({} blocks)", service.len());
    Ok(())
}

fn list(args: cli::DataDirArgs) -> Result<()> {
    let service = open_service(&args.data_dir)?;
    for block in service.blocks() {
        print_block(&block);
    }
    Ok(())
}

fn verify(args: cli::DataDirArgs) -> Result<()> {
    let service = open_service(&args.data_dir)?;
    if service.check_integrity() {
        println!("ledger integrity verified, no errors found ({} blocks)", service.len());
        Ok(())
    } else {
        bail!("ledger integrity check FAILED");
    }
}

async fn watch(args: cli::WatchArgs) -> Result<()> {
    let service = open_service(&args.dir.data_dir)?;
    let config = MonitorConfig {
        interval: Duration::from_secs(args.interval_secs),
    };
    let (handle, mut alerts) = service.spawn_monitor(config);
    println!(
        "watching {} blocks, verifying every {}s (Ctrl-C to stop)",
        service.len(),
        args.interval_secs
    );

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown requested, stopping monitor");
            println!("shutting down");
            handle.shutdown().await.map_err(|violation| {
                anyhow::anyhow!("monitor had already failed: {violation}")
            })
        }
        alert = alerts.recv() => {
            match alert {
                Some(alert) => {
                    let message = alert_message(&alert);
                    tracing::error!(
                        violation = %alert.violation,
                        blocks = alert.chain_len,
                        "integrity violation reported by monitor"
                    );
                    bail!(message)
                }
                // The monitor never drops its sender while healthy.
                None => bail!("monitor stopped unexpectedly"),
            }
        }
    }
}

/// Renders a monitor alert for the operator.
fn alert_message(alert: &sigil_ledger::IntegrityAlert) -> String {
    format!(
        "INTEGRITY VIOLATION at {}: {} ({} blocks)",
        alert.detected_at, alert.violation, alert.chain_len
    )
}

fn print_block(block: &Block) {
    println!("Index: {}", block.index);
    println!("Timestamp: {}", block.timestamp);
    println!("Data: {}", block.data);
    println!("Data Hash: {}", block.data_hash);
    println!("Previous Hash: {}", block.previous_hash);
    println!("Block Hash: {}", block.hash);
    println!("------------------");
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_ledger::storage::block::parse_timestamp;
    use sigil_ledger::storage::IntegrityViolation;
    use sigil_ledger::IntegrityAlert;

    #[test]
    fn alert_message_names_the_violation() {
        let alert = IntegrityAlert {
            violation: IntegrityViolation::DataHashMismatch { index: 3 },
            chain_len: 5,
            detected_at: parse_timestamp("2026-08-28T00:00:00.000000Z").unwrap(),
        };

        let message = alert_message(&alert);
        assert!(message.contains("INTEGRITY VIOLATION"));
        assert!(message.contains("block 3"));
        assert!(message.contains("5 blocks"));
    }
}
