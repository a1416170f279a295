//! Parsing of raw model output into closed verdicts
//!
//! Models wrap JSON in code fences, add chatter around it, or pick their own
//! spelling of an enum value. Anything that still cannot be read as one of
//! the declared values is a contract violation attributed to the node.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::graph::Node;
use crate::types::{RouteDecision, Source};

/// Find the first JSON object in `raw`
pub(crate) fn extract_json(raw: &str) -> Option<Value> {
    let trimmed = strip_fences(raw);
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&trimmed[start..=end]) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop an optional language tag on the opening fence
    let rest = match rest.split_once('\n') {
        Some((tag, body)) if !tag.contains('{') => body,
        _ => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn normalize(value: &str) -> String {
    value
        .trim()
        .to_ascii_lowercase()
        .replace(['-', ' '], "_")
}

/// Router output: `{"datasource": ..., "needs_retrieval": ...}`
pub(crate) fn parse_route(raw: &str) -> Result<RouteDecision> {
    let json = extract_json(raw)
        .ok_or_else(|| Error::contract(Node::Route, format!("no JSON object in {:?}", raw.trim())))?;

    let needs_retrieval = match json.get("needs_retrieval") {
        None | Some(Value::Null) => None,
        Some(Value::Bool(b)) => Some(*b),
        Some(other) => {
            return Err(Error::contract(
                Node::Route,
                format!("needs_retrieval must be a boolean, got {}", other),
            ))
        }
    };

    let source = match json.get("datasource").or_else(|| json.get("source")) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(match normalize(s).as_str() {
            "vectorstore" | "vector_store" => Source::VectorStore,
            "web_search" | "websearch" | "web" => Source::WebSearch,
            "none" | "no_retrieval" => Source::None,
            other => {
                return Err(Error::contract(
                    Node::Route,
                    format!("unknown datasource {:?}", other),
                ))
            }
        }),
        Some(other) => {
            return Err(Error::contract(
                Node::Route,
                format!("datasource must be a string, got {}", other),
            ))
        }
    };

    let (needs_retrieval, source) = match (needs_retrieval, source) {
        (Some(needs), Some(source)) => (needs, source),
        (None, Some(source)) => (source != Source::None, source),
        (Some(false), None) => (false, Source::None),
        (Some(true), None) | (None, None) => {
            return Err(Error::contract(Node::Route, "missing datasource"));
        }
    };

    RouteDecision::from_parts(needs_retrieval, source).ok_or_else(|| {
        Error::contract(
            Node::Route,
            format!(
                "inconsistent route: needs_retrieval={} datasource={}",
                needs_retrieval, source
            ),
        )
    })
}

/// Grader output: `{"binary_score": "yes" | "no"}`, or a bare yes/no
pub(crate) fn parse_binary(node: Node, raw: &str) -> Result<bool> {
    if let Some(json) = extract_json(raw) {
        return match json.get("binary_score").or_else(|| json.get("score")) {
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::String(s)) => yes_no(s).ok_or_else(|| {
                Error::contract(node, format!("binary_score must be yes or no, got {:?}", s))
            }),
            Some(other) => Err(Error::contract(
                node,
                format!("binary_score must be yes or no, got {}", other),
            )),
            None => Err(Error::contract(node, "missing binary_score")),
        };
    }

    let bare = strip_fences(raw).trim_end_matches('.');
    yes_no(bare).ok_or_else(|| Error::contract(node, format!("expected yes or no, got {:?}", raw.trim())))
}

fn yes_no(value: &str) -> Option<bool> {
    match normalize(value).as_str() {
        "yes" | "true" => Some(true),
        "no" | "false" => Some(false),
        _ => None,
    }
}

/// Rewriter output: the first non-empty line, without labels or quotes
pub(crate) fn clean_rewrite(raw: &str) -> Result<String> {
    let line = strip_fences(raw)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();

    let line = ["improved question:", "rewritten question:", "question:"]
        .iter()
        .find_map(|label| {
            line.get(..label.len())
                .filter(|head| head.eq_ignore_ascii_case(label))
                .map(|_| line[label.len()..].trim())
        })
        .unwrap_or(line);

    let question = line.trim_matches(|c| c == '"' || c == '\'' || c == '*').trim();
    if question.is_empty() {
        return Err(Error::contract(Node::Rewrite, "rewriter returned an empty question"));
    }
    Ok(question.to_string())
}

/// Generator output: any non-empty text
pub(crate) fn clean_generation(raw: &str) -> Result<String> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(Error::contract(Node::Generate, "generator returned an empty answer"));
    }
    Ok(text.to_string())
}
