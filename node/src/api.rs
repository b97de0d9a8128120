//! # REST API
//!
//! Builds the axum router that exposes the registry's read side over HTTP.
//! All endpoints share application state through axum's `State` extractor.
//! Nothing here mutates state; writes go through `mintgate-node apply`.
//!
//! ## Endpoints
//!
//! | Method | Path                          | Description                     |
//! |--------|-------------------------------|---------------------------------|
//! | GET    | `/health`                     | Liveness probe                  |
//! | GET    | `/denoms`                     | Paginated denom records         |
//! | GET    | `/denoms/:denom`              | One denom record                |
//! | GET    | `/balances/:address/:denom`   | Account balance in one denom    |
//! | GET    | `/metrics`                    | Prometheus text exposition      |

use axum::{
    extract::{FromRef, Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use mintgate_contracts::RegistryError;
use mintgate_protocol::{Amount, DenomRecord};

use crate::app::NodeRegistry;
use crate::metrics::{self, SharedMetrics};

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone: everything behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The node's reported version string.
    pub version: String,
    /// Registry opened on the node's database. Queries take `&self`, so no
    /// lock is needed.
    pub registry: Arc<NodeRegistry>,
    /// Reference to Prometheus metrics for in-handler recording.
    pub metrics: SharedMetrics,
}

impl FromRef<AppState> for SharedMetrics {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.metrics)
    }
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, and tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/denoms", get(list_denoms_handler))
        .route("/denoms/:denom", get(denom_handler))
        .route("/balances/:address/:denom", get(balance_handler))
        .route("/metrics", get(metrics::metrics_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request / Response Types
// ---------------------------------------------------------------------------

/// Query string for `GET /denoms`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub start_after: Option<String>,
    pub limit: Option<u32>,
}

/// Response payload for `GET /denoms`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DenomPage {
    pub denoms: Vec<DenomRecord>,
    /// Cursor for the next page, present when this page came back full.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Response payload for `GET /balances/:address/:denom`.
#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub address: String,
    pub denom: String,
    pub amount: Amount,
}

/// Error body returned with every non-2xx status.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl ToString) -> Response {
    let body = ErrorResponse {
        error: error.to_string(),
    };
    (status, Json(body)).into_response()
}

/// Maps a registry error onto an HTTP status.
fn registry_error(err: RegistryError) -> Response {
    let status = match &err {
        RegistryError::InvalidAddress { .. } | RegistryError::InvalidDenom(_) => {
            StatusCode::BAD_REQUEST
        }
        RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
        RegistryError::AlreadyExists(_) => StatusCode::CONFLICT,
        RegistryError::Unauthorized { .. } => StatusCode::FORBIDDEN,
        RegistryError::Ledger(_) | RegistryError::Store(_) => {
            tracing::error!(error = %err, "query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_response(status, err)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health` — returns 200 if the node is alive.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "ok", "version": state.version })),
    )
}

/// `GET /denoms?start_after=<denom>&limit=<n>` — one page of records.
async fn list_denoms_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Response {
    let limit = state.registry.config().page_limit(params.limit);
    match state
        .registry
        .list_denoms(params.start_after.as_deref(), params.limit)
    {
        Ok(denoms) => {
            let next = if limit > 0 && denoms.len() == limit {
                denoms.last().map(|r| r.denom.to_string())
            } else {
                None
            };
            (StatusCode::OK, Json(DenomPage { denoms, next })).into_response()
        }
        Err(e) => registry_error(e),
    }
}

/// `GET /denoms/:denom` — a single record, or 404.
async fn denom_handler(Path(denom): Path<String>, State(state): State<AppState>) -> Response {
    match state.registry.get_denom(&denom) {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            format!("denom `{denom}` does not exist"),
        ),
        Err(e) => registry_error(e),
    }
}

/// `GET /balances/:address/:denom` — an account's balance. Accounts that
/// never held the denom report zero.
async fn balance_handler(
    Path((address, denom)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Response {
    match state.registry.balance(&address, &denom) {
        Ok(amount) => (
            StatusCode::OK,
            Json(BalanceResponse {
                address,
                denom,
                amount,
            }),
        )
            .into_response(),
        Err(e) => registry_error(e),
    }
}
