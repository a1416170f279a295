//! HTTP shell tests using `tower::ServiceExt::oneshot`

mod common;

use std::sync::Arc;

use adaptive_rag::server::{state::AppState, RagServer};
use adaptive_rag::types::RouteDecision;
use adaptive_rag::Node;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use common::{orchestrator, Fakes, Reply, Script};
use serde_json::Value;
use tower::ServiceExt;

fn app(fakes: Fakes) -> Router {
    let (_, orch) = orchestrator(fakes);
    let state = AppState::from_parts(common::config(), Arc::new(orch), None);
    RagServer::with_state(state).build_router()
}

async fn post_query(app: Router, body: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/query")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn test_query_returns_answer_and_trace() {
    let (status, body) = post_query(
        app(Fakes::default()),
        r#"{"question": "What are the types of agent memory?"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "generated answer");
    assert_eq!(body["trace"].as_array().unwrap().len(), 5);
    assert_eq!(body["trace"][0]["node"], "route");
    assert!(body.get("no_answer").is_none());
}

#[tokio::test]
async fn test_query_no_answer_is_success() {
    let fakes = Fakes {
        route: Script::always(RouteDecision::no_retrieval()),
        ..Fakes::default()
    };
    let (status, body) = post_query(app(fakes), r#"{"question": "hello"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["no_answer"], true);
    assert_eq!(body["reason"], "not_retrieval_needed");
}

#[tokio::test]
async fn test_empty_question_is_bad_request() {
    let (status, body) = post_query(app(Fakes::default()), r#"{"question": "  "}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "invalid_input");
}

#[tokio::test]
async fn test_contract_violation_is_bad_gateway_with_trace() {
    let fakes = Fakes {
        route: Script::replying(Reply::Violation(Node::Route, "unknown datasource")),
        ..Fakes::default()
    };
    let (status, body) = post_query(app(fakes), r#"{"question": "q"}"#).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["type"], "upstream_contract_violation");
    assert_eq!(body["error"]["node"], "route");
    assert_eq!(body["trace"][0]["detail"]["kind"], "failed");
}

#[tokio::test]
async fn test_llm_outage_is_service_unavailable_with_trace() {
    let fakes = Fakes {
        grounding: Script::replying(Reply::Unavailable("connection refused")),
        ..Fakes::default()
    };
    let (status, body) = post_query(app(fakes), r#"{"question": "q"}"#).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["type"], "llm_error");
    assert_eq!(body["error"]["node"], "quality_check");
    let trace = body["trace"].as_array().unwrap();
    assert_eq!(trace.len(), 5);
    assert_eq!(trace[4]["detail"]["kind"], "failed");
}

#[tokio::test]
async fn test_graph_endpoint() {
    let (status, bytes) = get(app(Fakes::default()), "/api/graph").await;
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["initial"], "route");
    assert_eq!(body["nodes"].as_array().unwrap().len(), 7);
    assert!(body["mermaid"].as_str().unwrap().starts_with("flowchart TD"));
}

#[tokio::test]
async fn test_health_and_ready() {
    let (status, bytes) = get(app(Fakes::default()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"OK");

    let (status, _) = get(app(Fakes::default()), "/ready").await;
    assert_eq!(status, StatusCode::OK);
}
