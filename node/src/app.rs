//! # Registry Host
//!
//! Wires the registry to the sled database and drives batches of messages
//! through it. Each message is its own state transition at its own height;
//! the last applied height is persisted alongside the records so a restarted
//! node continues where it stopped.

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use mintgate_contracts::{Context, DenomRegistry, ExecuteMsg};
use mintgate_protocol::storage::{SledLedger, SledRecordStore};
use mintgate_protocol::{EventLog, EventRecord, RegistryDb, TracingSink};

use crate::config::NodeConfig;
use crate::metrics::NodeMetrics;

/// Events go to an in-memory log (drained and printed by `apply`) and to
/// the `mintgate::events` tracing target.
pub type NodeSink = (EventLog, TracingSink);

/// The registry as the node runs it.
pub type NodeRegistry = DenomRegistry<SledRecordStore, SledLedger, NodeSink>;

/// Opens (or creates) the database under `config.data_dir` and builds a
/// registry on top of it.
pub fn open_registry(config: &NodeConfig) -> Result<(RegistryDb, NodeRegistry)> {
    let db_path = config.db_path();
    std::fs::create_dir_all(&db_path)
        .with_context(|| format!("failed to create database directory: {}", db_path.display()))?;

    let db = RegistryDb::open(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    tracing::info!(path = %db_path.display(), "database opened");

    let registry = build_registry(&db, config)?;
    Ok((db, registry))
}

pub fn build_registry(db: &RegistryDb, config: &NodeConfig) -> Result<NodeRegistry> {
    DenomRegistry::new(
        db.record_store(),
        db.ledger(),
        (EventLog::new(), TracingSink),
        config.registry.clone(),
    )
    .context("invalid registry configuration")
}

/// Outcome of one message in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub height: u64,
    pub op: &'static str,
    /// `ok`, or the error code.
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub events: Vec<EventRecord>,
}

/// Totals for a batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplySummary {
    pub applied: usize,
    pub rejected: usize,
    pub first_height: u64,
    pub last_height: u64,
}

/// Applies `msgs` in order, one height per message.
///
/// A rejected message still consumes its height. Rejections are reported
/// in the receipts; only storage failures outside the registry abort the
/// batch.
pub fn apply_batch(
    db: &RegistryDb,
    registry: &mut NodeRegistry,
    metrics: &NodeMetrics,
    msgs: &[ExecuteMsg],
    time: DateTime<Utc>,
) -> Result<(ApplySummary, Vec<Receipt>)> {
    let start = db.last_height().context("failed to read last height")?.unwrap_or(0);
    let mut summary = ApplySummary {
        first_height: start + 1,
        last_height: start,
        ..ApplySummary::default()
    };
    let mut receipts = Vec::with_capacity(msgs.len());

    for (offset, msg) in msgs.iter().enumerate() {
        let height = start + 1 + offset as u64;
        let ctx = Context::new(height, time);

        let receipt = match registry.execute(&ctx, msg) {
            Ok(_) => {
                summary.applied += 1;
                Receipt {
                    height,
                    op: msg.name(),
                    outcome: "ok",
                    error: None,
                    events: registry.events_mut().0.drain(),
                }
            }
            Err(e) => {
                summary.rejected += 1;
                tracing::warn!(height, op = msg.name(), error = %e, "message rejected");
                Receipt {
                    height,
                    op: msg.name(),
                    outcome: e.code(),
                    error: Some(e.to_string()),
                    events: Vec::new(),
                }
            }
        };
        metrics.record_operation(receipt.op, receipt.outcome);

        db.set_last_height(height)
            .with_context(|| format!("failed to persist height {height}"))?;
        summary.last_height = height;
        metrics.last_height.set(height as i64);
        receipts.push(receipt);
    }

    db.flush().context("failed to flush database")?;
    let count = registry.denom_count().context("failed to count denoms")?;
    metrics.denoms_registered.set(count as i64);

    tracing::info!(
        applied = summary.applied,
        rejected = summary.rejected,
        last_height = summary.last_height,
        "batch applied"
    );
    Ok((summary, receipts))
}
