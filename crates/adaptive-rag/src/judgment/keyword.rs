//! Regex-based router that needs no model call.
//!
//! Scores indexed-topic hits against recency cues. Questions about an
//! indexed topic go to the vector store, questions that need fresh
//! information go to web search, and small talk needs no retrieval.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use super::Router;
use crate::config::RouterConfig;
use crate::error::{Error, Result};
use crate::types::RouteDecision;

static RECENCY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(latest|recent(ly)?|news|today|tonight|yesterday|tomorrow|this\s+(week|month|year|season)|current(ly)?|right\s+now|20[2-9]\d|draft(ed)?|scores?|prices?|stocks?|weather|announce[ds]?|released?)\b").unwrap()
});

static SMALL_TALK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(hi|hello|hey|thanks|thank\s+you|good\s+(morning|afternoon|evening)|bye|goodbye)\b[\s!.,]*$").unwrap()
});

static QUESTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\?\s*$|^\s*(what|who|whom|whose|when|where|why|how|which|is|are|was|were|does|do|did|can|could|should|explain|describe|list|compare|tell\s+me)\b)").unwrap()
});

/// Heuristic router over the configured indexed topics
pub struct KeywordRouter {
    topic_re: Option<Regex>,
}

impl KeywordRouter {
    pub fn new(config: &RouterConfig) -> Result<Self> {
        let alternatives: Vec<String> = config
            .indexed_topics
            .iter()
            .filter_map(|topic| topic_pattern(topic))
            .collect();

        let topic_re = if alternatives.is_empty() {
            None
        } else {
            let pattern = format!(r"(?i)\b({})\b", alternatives.join("|"));
            Some(Regex::new(&pattern).map_err(|e| Error::Config(format!("Invalid router topic: {}", e)))?)
        };

        Ok(Self { topic_re })
    }

    /// Classify `question` without any I/O
    pub fn classify(&self, question: &str) -> RouteDecision {
        if SMALL_TALK_RE.is_match(question) {
            return RouteDecision::no_retrieval();
        }

        let topic_hits = self
            .topic_re
            .as_ref()
            .map_or(0, |re| re.find_iter(question).count());
        let recency_hits = RECENCY_RE.find_iter(question).count();

        tracing::debug!(topic_hits, recency_hits, "Keyword routing scores");

        match (topic_hits, recency_hits) {
            (0, 0) if QUESTION_RE.is_match(question) => RouteDecision::web_search(),
            (0, 0) => RouteDecision::no_retrieval(),
            (t, r) if t >= r => RouteDecision::vector_store(),
            _ => RouteDecision::web_search(),
        }
    }
}

/// `"adversarial attacks"` → `adversarial\s+attacks?`
fn topic_pattern(topic: &str) -> Option<String> {
    let words: Vec<&str> = topic.split_whitespace().collect();
    let (last, init) = words.split_last()?;
    let stem = last.strip_suffix('s').filter(|s| s.len() > 2).unwrap_or(*last);

    let mut parts: Vec<String> = init.iter().map(|w| regex::escape(w)).collect();
    parts.push(format!("{}s?", regex::escape(stem)));
    Some(parts.join(r"\s+"))
}

#[async_trait]
impl Router for KeywordRouter {
    async fn route(&self, question: &str) -> Result<RouteDecision> {
        Ok(self.classify(question))
    }
}
