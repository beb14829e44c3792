//! # CLI Interface
//!
//! Defines the command-line argument structure for the `sigil` binary using
//! `clap` derive. Subcommands: `add`, `list`, `verify`, `watch`, and
//! `version`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// SIGIL tamper-evident ledger.
///
/// Front-end for a local encrypted ledger: appends text records to a
/// hash-linked chain, persists it sealed with AES-256-GCM, and verifies
/// that nothing has been tampered with.
#[derive(Parser, Debug)]
#[command(
    name = "sigil",
    about = "SIGIL tamper-evident ledger",
    version,
    propagate_version = true
)]
pub struct SigilCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the `sigil` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Append a record to the ledger and save it.
    Add(AddArgs),
    /// Display every block in the ledger.
    List(DataDirArgs),
    /// Run both integrity checks and report the result.
    Verify(DataDirArgs),
    /// Keep the ledger open and run the background integrity monitor
    /// until Ctrl-C, printing any alert it raises.
    Watch(WatchArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments shared by every subcommand that touches the ledger files.
#[derive(Args, Debug)]
pub struct DataDirArgs {
    /// Directory holding the sealed ledger and its key file.
    ///
    /// Created on first use if it does not exist.
    #[arg(long, short = 'd', env = "SIGIL_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,
}

/// Arguments for the `add` subcommand.
#[derive(Args, Debug)]
pub struct AddArgs {
    #[command(flatten)]
    pub dir: DataDirArgs,

    /// The record payload to append.
    pub data: String,

    /// Append without persisting. The block is lost when the process
    /// exits; mainly useful for demonstrating explicit durability.
    #[arg(long)]
    pub no_save: bool,
}

/// Arguments for the `watch` subcommand.
#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub dir: DataDirArgs,

    /// Seconds between background verification passes.
    #[arg(long, env = "SIGIL_WATCH_INTERVAL", default_value_t = 60)]
    pub interval_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        SigilCli::command().debug_assert();
    }

    #[test]
    fn add_parses_payload_and_data_dir() {
        let cli = SigilCli::parse_from(["sigil", "add", "-d", "/tmp/ledger", "hello"]);
        match cli.command {
            Commands::Add(args) => {
                assert_eq!(args.data, "hello");
                assert_eq!(args.dir.data_dir.to_str(), Some("/tmp/ledger"));
                assert!(!args.no_save);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
