//! Closed verdict enumerations returned by the judgment functions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Retrieval source chosen by the router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    VectorStore,
    WebSearch,
    #[default]
    None,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Source::VectorStore => "vector_store",
            Source::WebSearch => "web_search",
            Source::None => "none",
        };
        f.write_str(name)
    }
}

/// Router output.
///
/// Only three combinations are representable: retrieval from the vector
/// store, retrieval from web search, or no retrieval at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RouteParts")]
pub struct RouteDecision {
    needs_retrieval: bool,
    source: Source,
}

#[derive(Deserialize)]
struct RouteParts {
    needs_retrieval: bool,
    #[serde(default)]
    source: Source,
}

impl TryFrom<RouteParts> for RouteDecision {
    type Error = String;

    fn try_from(parts: RouteParts) -> Result<Self, Self::Error> {
        Self::from_parts(parts.needs_retrieval, parts.source).ok_or_else(|| {
            format!(
                "inconsistent route: needs_retrieval={} source={}",
                parts.needs_retrieval, parts.source
            )
        })
    }
}

impl RouteDecision {
    pub const fn vector_store() -> Self {
        Self {
            needs_retrieval: true,
            source: Source::VectorStore,
        }
    }

    pub const fn web_search() -> Self {
        Self {
            needs_retrieval: true,
            source: Source::WebSearch,
        }
    }

    pub const fn no_retrieval() -> Self {
        Self {
            needs_retrieval: false,
            source: Source::None,
        }
    }

    /// Build from raw parts, rejecting inconsistent combinations
    pub fn from_parts(needs_retrieval: bool, source: Source) -> Option<Self> {
        match (needs_retrieval, source) {
            (true, Source::VectorStore) => Some(Self::vector_store()),
            (true, Source::WebSearch) => Some(Self::web_search()),
            (false, Source::None) => Some(Self::no_retrieval()),
            _ => None,
        }
    }

    pub fn needs_retrieval(&self) -> bool {
        self.needs_retrieval
    }

    pub fn source(&self) -> Source {
        self.source
    }
}

impl fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.needs_retrieval {
            write!(f, "source={}", self.source)
        } else {
            f.write_str("needs_retrieval=false")
        }
    }
}

/// Relevance grader output for one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relevance {
    Relevant,
    NotRelevant,
}

impl Relevance {
    pub fn is_relevant(self) -> bool {
        matches!(self, Relevance::Relevant)
    }
}

/// Hallucination checker output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grounding {
    Grounded,
    Hallucinated,
}

/// Completeness checker output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completeness {
    Complete,
    Incomplete,
}

/// Combined result of the quality-check node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityVerdict {
    Pass,
    Hallucinated,
    Incomplete,
}

impl QualityVerdict {
    /// Hallucination takes priority: completeness only matters for a
    /// grounded generation.
    pub fn combine(grounding: Grounding, completeness: Option<Completeness>) -> Self {
        match (grounding, completeness) {
            (Grounding::Hallucinated, _) => QualityVerdict::Hallucinated,
            (Grounding::Grounded, Some(Completeness::Complete)) => QualityVerdict::Pass,
            (Grounding::Grounded, _) => QualityVerdict::Incomplete,
        }
    }
}

impl fmt::Display for QualityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QualityVerdict::Pass => "pass",
            QualityVerdict::Hallucinated => "hallucinated",
            QualityVerdict::Incomplete => "incomplete",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_decision_rejects_inconsistent_parts() {
        assert_eq!(
            RouteDecision::from_parts(true, Source::WebSearch),
            Some(RouteDecision::web_search())
        );
        assert_eq!(
            RouteDecision::from_parts(false, Source::None),
            Some(RouteDecision::no_retrieval())
        );
        assert!(RouteDecision::from_parts(true, Source::None).is_none());
        assert!(RouteDecision::from_parts(false, Source::VectorStore).is_none());
    }

    #[test]
    fn test_route_decision_deserialization_is_checked() {
        let ok: RouteDecision =
            serde_json::from_str(r#"{"needs_retrieval": true, "source": "web_search"}"#).unwrap();
        assert_eq!(ok, RouteDecision::web_search());

        let bad = serde_json::from_str::<RouteDecision>(r#"{"needs_retrieval": true, "source": "none"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_hallucination_takes_priority() {
        assert_eq!(
            QualityVerdict::combine(Grounding::Hallucinated, Some(Completeness::Incomplete)),
            QualityVerdict::Hallucinated
        );
        assert_eq!(
            QualityVerdict::combine(Grounding::Grounded, Some(Completeness::Incomplete)),
            QualityVerdict::Incomplete
        );
        assert_eq!(
            QualityVerdict::combine(Grounding::Grounded, Some(Completeness::Complete)),
            QualityVerdict::Pass
        );
        // Grounded but the completeness check never resolved
        assert_eq!(
            QualityVerdict::combine(Grounding::Grounded, None),
            QualityVerdict::Incomplete
        );
    }
}
