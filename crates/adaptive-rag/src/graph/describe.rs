//! Text renderings of the graph for the CLI and the HTTP shell

use super::node::Node;

/// One conditional edge: (from, condition, to)
pub type EdgeSpec = (&'static str, &'static str, &'static str);

/// Every edge of the graph, in table order
pub const EDGES: &[EdgeSpec] = &[
    ("route", "needs_retrieval = false", "done (no answer)"),
    ("route", "source = vector_store", "retrieve"),
    ("route", "source = web_search", "search"),
    ("retrieve", "documents produced", "grade"),
    ("search", "documents produced", "grade"),
    ("grade", "any document relevant", "generate"),
    ("grade", "no document relevant", "rewrite"),
    ("rewrite", "loop_count < max_loops", "route"),
    ("rewrite", "loop_count >= max_loops", "done (no answer)"),
    ("generate", "always", "quality_check"),
    ("quality_check", "hallucinated, retries left", "generate"),
    ("quality_check", "hallucinated, retries spent", "rewrite"),
    ("quality_check", "incomplete", "rewrite"),
    ("quality_check", "grounded and complete", "done (answer)"),
];

/// Plain-text edge table
pub fn describe() -> String {
    let mut out = String::new();
    out.push_str(&format!("start: {}\n\n", Node::INITIAL));
    out.push_str(&format!("{:<15} {:<30} {}\n", "FROM", "WHEN", "TO"));
    for (from, when, to) in EDGES {
        out.push_str(&format!("{:<15} {:<30} {}\n", from, when, to));
    }
    out
}

/// Mermaid flowchart of the same edges
pub fn mermaid() -> String {
    let id = |name: &str| match name {
        "done (answer)" => "done_answer".to_string(),
        "done (no answer)" => "done_none".to_string(),
        other => other.to_string(),
    };

    let mut out = String::from("flowchart TD\n");
    out.push_str(&format!("    start((start)) --> {}\n", Node::INITIAL));
    for (from, when, to) in EDGES {
        out.push_str(&format!("    {} -->|{}| {}\n", id(from), when, id(to)));
    }
    out.push_str("    done_answer([done: answer])\n");
    out.push_str("    done_none([done: no answer])\n");
    out
}
