//! Graph description endpoint

use axum::Json;
use serde_json::{json, Value};

use crate::graph::{self, Node, EDGES};

/// GET /api/graph - nodes, edges and a mermaid rendering
pub async fn describe_graph() -> Json<Value> {
    let edges: Vec<Value> = EDGES
        .iter()
        .map(|(from, when, to)| json!({ "from": from, "when": when, "to": to }))
        .collect();

    Json(json!({
        "initial": Node::INITIAL,
        "nodes": Node::ALL,
        "edges": edges,
        "mermaid": graph::mermaid(),
    }))
}
