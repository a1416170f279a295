//! Evidence documents produced by retrieval and web search

use serde::{Deserialize, Serialize};

/// A retrieved piece of evidence.
///
/// Fields are private so a document cannot change after a retrieval or
/// search call produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Document {
    content: String,
    source_id: String,
}

impl Document {
    pub fn new(content: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source_id: source_id.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Short preview for logs
    pub fn snippet(&self, max_chars: usize) -> String {
        let mut chars = self.content.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{}...", head.trim_end())
        } else {
            head
        }
    }
}
