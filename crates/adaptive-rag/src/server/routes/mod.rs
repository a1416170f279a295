//! API routes for the adaptive RAG server

pub mod graph;
pub mod query;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/query", post(query::query))
        .route("/graph", get(graph::describe_graph))
        .route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<Value> {
    let graph = &state.config().graph;
    Json(json!({
        "name": "adaptive-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Adaptive RAG: routed retrieval with graded evidence and checked answers",
        "endpoints": {
            "POST /api/query": "Answer a question; returns the answer or a no-answer reason with the trace",
            "GET /api/graph": "Nodes and conditional edges of the decision graph",
            "GET /api/info": "This document"
        },
        "limits": {
            "max_loops": graph.max_loops,
            "max_regenerate_retries": graph.max_regenerate_retries,
            "per_call_timeout_secs": graph.per_call_timeout_secs
        }
    }))
}
