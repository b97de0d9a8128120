// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Mintgate Node
//!
//! Entry point for the `mintgate-node` binary. Parses CLI arguments, loads
//! the configuration file, initializes logging, and dispatches to one of:
//!
//! - `apply`   — run a batch of registry messages against the database
//! - `query`   — read a denom, a page of denoms, or a balance
//! - `export`  — dump every denom record as genesis JSON
//! - `import`  — replace every denom record from genesis JSON
//! - `serve`   — read-only HTTP API plus `/metrics`
//! - `version` — print build version information

mod api;
mod app;
mod cli;
mod config;
mod logging;
mod metrics;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;

use mintgate_contracts::{ExecuteMsg, GenesisState};

use cli::{Commands, MintgateCli, QueryCommand};
use config::NodeConfig;
use logging::LogFormat;
use metrics::NodeMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = MintgateCli::parse();

    if let Commands::Version = cli.command {
        print_version();
        return Ok(());
    }

    let mut config = NodeConfig::load(cli.config.as_deref(), cli.data_dir.as_deref())?;
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    logging::init_logging(&config.log_level, LogFormat::from_str_lossy(&config.log_format));

    match cli.command {
        Commands::Apply(args) => apply(&config, args),
        Commands::Query(args) => query(&config, args.query),
        Commands::Export(args) => export(&config, args),
        Commands::Import(args) => import(&config, args),
        Commands::Serve(args) => serve(config, args).await,
        Commands::Version => Ok(()),
    }
}

/// Applies a JSON batch of messages. Receipts are printed to stdout as JSON
/// lines, the summary last.
fn apply(config: &NodeConfig, args: cli::ApplyArgs) -> Result<()> {
    let raw = std::fs::read_to_string(&args.ops)
        .with_context(|| format!("failed to read {}", args.ops.display()))?;
    let msgs: Vec<ExecuteMsg> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse messages in {}", args.ops.display()))?;

    let (db, mut registry) = app::open_registry(config)?;
    let metrics = NodeMetrics::new().context("failed to create metrics registry")?;

    let (summary, receipts) =
        app::apply_batch(&db, &mut registry, &metrics, &msgs, chrono::Utc::now())?;

    for receipt in &receipts {
        println!("{}", serde_json::to_string(receipt)?);
    }
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

fn query(config: &NodeConfig, query: QueryCommand) -> Result<()> {
    let (_db, registry) = app::open_registry(config)?;

    let output = match query {
        QueryCommand::Denom { denom } => match registry.get_denom(&denom)? {
            Some(record) => serde_json::to_string_pretty(&record)?,
            None => bail!("denom `{denom}` does not exist"),
        },
        QueryCommand::List { start_after, limit } => {
            let records = registry.list_denoms(start_after.as_deref(), limit)?;
            serde_json::to_string_pretty(&records)?
        }
        QueryCommand::Balance { address, denom } => {
            let amount = registry.balance(&address, &denom)?;
            serde_json::to_string_pretty(&serde_json::json!({
                "address": address,
                "denom": denom,
                "amount": amount,
            }))?
        }
    };
    println!("{output}");
    Ok(())
}

fn export(config: &NodeConfig, args: cli::ExportArgs) -> Result<()> {
    let (_db, registry) = app::open_registry(config)?;
    let genesis = registry.export_genesis()?;

    let json = serde_json::to_string_pretty(&genesis)?;
    std::fs::write(&args.out, json)
        .with_context(|| format!("failed to write {}", args.out.display()))?;

    tracing::info!(denoms = genesis.denoms.len(), out = %args.out.display(), "genesis exported");
    Ok(())
}

fn import(config: &NodeConfig, args: cli::ImportArgs) -> Result<()> {
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let genesis: GenesisState = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse genesis in {}", args.file.display()))?;

    let (db, mut registry) = app::open_registry(config)?;
    registry
        .init_genesis(&genesis)
        .context("genesis import rejected")?;
    db.flush().context("failed to flush database")?;

    println!("imported {} denoms", genesis.denoms.len());
    Ok(())
}

/// Serves the read-only API until SIGINT or SIGTERM.
async fn serve(config: NodeConfig, args: cli::ServeArgs) -> Result<()> {
    let port = args.port.unwrap_or(config.api_port);
    tracing::info!(
        port,
        data_dir = %config.data_dir.display(),
        "starting mintgate-node"
    );

    let (_db, registry) = app::open_registry(&config)?;
    let node_metrics = Arc::new(NodeMetrics::new().context("failed to create metrics registry")?);
    node_metrics
        .denoms_registered
        .set(registry.denom_count()? as i64);

    let app_state = api::AppState {
        version: format!(
            "{} (protocol {})",
            env!("CARGO_PKG_VERSION"),
            mintgate_protocol::config::PROTOCOL_VERSION,
        ),
        registry: Arc::new(registry),
        metrics: node_metrics,
    };

    let router = api::create_router(app_state);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind API listener on {addr}"))?;
    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server error")?;

    tracing::info!("mintgate-node stopped");
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("mintgate-node {}", env!("CARGO_PKG_VERSION"));
    println!("protocol      {}", mintgate_protocol::config::PROTOCOL_VERSION);
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received, draining connections");
}
