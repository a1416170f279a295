//! Web search trait for the Search node

use async_trait::async_trait;
use crate::error::Result;
use crate::types::Document;

/// Trait for live web search
///
/// Implementations:
/// - `TavilySearch`: Tavily search API
/// - `DisabledWebSearch`: always returns no results
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Search the web; results are already truncated to the configured count
    async fn search(&self, query: &str) -> Result<Vec<Document>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// Used when no web search backend is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledWebSearch;

#[async_trait]
impl WebSearch for DisabledWebSearch {
    async fn search(&self, query: &str) -> Result<Vec<Document>> {
        tracing::debug!("Web search disabled, no results for {:?}", query);
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "disabled"
    }
}
