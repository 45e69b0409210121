//! Axum HTTP surface.
//!
//! Two routes: `POST /api/query` runs the orchestrated cache-or-origin flow,
//! `GET /health` is a static liveness payload. Every query gets a UUID
//! request id attached to its tracing span.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::orchestrator::{QueryOrchestrator, Source};

/// Shared state for all handlers.
pub struct AppState {
    pub orchestrator: QueryOrchestrator,
}

/// Body of `POST /api/query`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub force_refresh: bool,
}

/// Response envelope for `POST /api/query`.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub response: String,
    pub metadata: QueryMetadata,
}

#[derive(Debug, Serialize)]
pub struct QueryMetadata {
    pub source: Source,
    pub timing: HashMap<String, f64>,
}

/// POST /api/query — resolve a query from cache or origin.
pub async fn handle_query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Json<QueryResponse> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("query", %request_id);

    let result = state
        .orchestrator
        .handle(&request.query, request.force_refresh)
        .instrument(span)
        .await;

    Json(QueryResponse {
        response: result.response,
        metadata: QueryMetadata {
            source: result.source,
            timing: result.timing,
        },
    })
}

/// GET /health — static liveness payload.
pub async fn get_health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Build the axum router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/query", post(handle_query))
        .route("/health", get(get_health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Bind `addr` and serve until ctrl-c.
pub async fn serve(state: AppState, addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
}
