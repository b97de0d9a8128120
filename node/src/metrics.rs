//! # Prometheus Metrics
//!
//! Operational metrics for the registry node, rendered at `GET /metrics`.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] with
//! the `mintgate` prefix so they do not collide with any default global
//! registry consumers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Holds all Prometheus metric handles for the node.
///
/// Prometheus handles are reference-counted internally, so clones share
/// the same underlying series.
#[derive(Clone)]
pub struct NodeMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Registry operations by operation name and outcome (`ok` or an error
    /// code such as `unauthorized`).
    pub operations_total: IntCounterVec,
    /// Number of denom records currently stored.
    pub denoms_registered: IntGauge,
    /// Height of the last applied state transition.
    pub last_height: IntGauge,
}

impl NodeMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("mintgate".into()), None)?;

        let operations_total = IntCounterVec::new(
            Opts::new(
                "operations_total",
                "Registry operations applied, by operation and outcome",
            ),
            &["op", "outcome"],
        )?;
        registry.register(Box::new(operations_total.clone()))?;

        let denoms_registered =
            IntGauge::new("denoms_registered", "Number of denom records in the store")?;
        registry.register(Box::new(denoms_registered.clone()))?;

        let last_height = IntGauge::new("last_height", "Height of the last applied state transition")?;
        registry.register(Box::new(last_height.clone()))?;

        Ok(Self {
            registry,
            operations_total,
            denoms_registered,
            last_height,
        })
    }

    /// Counts one operation.
    pub fn record_operation(&self, op: &str, outcome: &str) {
        self.operations_total.with_label_values(&[op, outcome]).inc();
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Shared metrics state passed to axum handlers.
pub type SharedMetrics = Arc<NodeMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
///
/// Returns HTTP 500 if encoding fails.
pub async fn metrics_handler(State(metrics): State<SharedMetrics>) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations_are_labelled() {
        let metrics = NodeMetrics::new().unwrap();
        metrics.record_operation("create_denom", "ok");
        metrics.record_operation("create_denom", "ok");
        metrics.record_operation("mint_tokens", "unauthorized");
        metrics.denoms_registered.set(1);

        let text = metrics.encode().unwrap();
        assert!(text.contains(r#"mintgate_operations_total{op="create_denom",outcome="ok"} 2"#));
        assert!(text.contains(r#"mintgate_operations_total{op="mint_tokens",outcome="unauthorized"} 1"#));
        assert!(text.contains("mintgate_denoms_registered 1"));
    }
}
