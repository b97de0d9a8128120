//! # CLI Interface
//!
//! Defines the command-line argument structure for `mintgate-node` using
//! `clap` derive. Global flags override the configuration file; every one
//! of them also reads a `MINTGATE_*` environment variable.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Mintgate denom registry node.
///
/// Applies registry operations against a local sled database, answers
/// queries, moves genesis snapshots in and out, and serves a read-only
/// HTTP API with Prometheus metrics.
#[derive(Parser, Debug)]
#[command(
    name = "mintgate-node",
    about = "Mintgate denom registry node",
    version,
    propagate_version = true
)]
pub struct MintgateCli {
    /// Path to the node configuration file (TOML).
    ///
    /// When omitted, the node looks for `config.toml` in the data directory.
    #[arg(long, short = 'c', env = "MINTGATE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Node data directory. The database is stored under `db/`.
    #[arg(long, short = 'd', env = "MINTGATE_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "MINTGATE_LOG_FORMAT", global = true)]
    pub log_format: Option<String>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply a JSON array of registry messages, one state transition each.
    Apply(ApplyArgs),
    /// Read registry state.
    Query(QueryArgs),
    /// Write every denom record to a genesis JSON file.
    Export(ExportArgs),
    /// Replace every denom record with the contents of a genesis JSON file.
    Import(ImportArgs),
    /// Serve the read-only HTTP API and `/metrics`.
    Serve(ServeArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `apply` subcommand.
#[derive(Parser, Debug)]
pub struct ApplyArgs {
    /// JSON file holding an array of messages.
    #[arg(long)]
    pub ops: PathBuf,
}

/// Arguments for the `query` subcommand.
#[derive(Parser, Debug)]
pub struct QueryArgs {
    #[command(subcommand)]
    pub query: QueryCommand,
}

#[derive(Subcommand, Debug)]
pub enum QueryCommand {
    /// Show one denom record.
    Denom {
        denom: String,
    },
    /// List denom records in ascending order.
    List {
        /// Exclusive cursor: start after this denom.
        #[arg(long)]
        start_after: Option<String>,
        /// Page size. Clamped to the configured maximum.
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show an account's balance in one denom.
    Balance {
        address: String,
        denom: String,
    },
}

/// Arguments for the `export` subcommand.
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Destination file. Overwritten if it exists.
    #[arg(long)]
    pub out: PathBuf,
}

/// Arguments for the `import` subcommand.
#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// Genesis JSON file to load.
    #[arg(long)]
    pub file: PathBuf,
}

/// Arguments for the `serve` subcommand.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Port for the HTTP API. Overrides `api_port` from the config file.
    #[arg(long, env = "MINTGATE_API_PORT")]
    pub port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        MintgateCli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = MintgateCli::parse_from([
            "mintgate-node",
            "query",
            "list",
            "--limit",
            "5",
            "--data-dir",
            "/tmp/mg",
        ]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/mg")));
        match cli.command {
            Commands::Query(QueryArgs {
                query: QueryCommand::List { start_after, limit },
            }) => {
                assert_eq!(start_after, None);
                assert_eq!(limit, Some(5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
