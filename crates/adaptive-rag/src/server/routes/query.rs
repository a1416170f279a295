//! Query endpoint running one question through the graph

use axum::{extract::State, Json};
use serde::Deserialize;
use std::time::Instant;

use crate::error::RunFailure;
use crate::server::state::AppState;
use crate::types::Outcome;

/// Body of `POST /api/query`
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
}

/// POST /api/query - answer a question or explain why there is no answer
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<Outcome>, RunFailure> {
    let start = Instant::now();
    tracing::info!("Query: \"{}\"", request.question);

    let outcome = state.orchestrator().run(&request.question).await?;

    tracing::info!(
        "Query finished in {}ms (answered: {}, steps: {})",
        start.elapsed().as_millis(),
        outcome.is_answered(),
        outcome.trace().len()
    );

    Ok(Json(outcome))
}
