//! Document store trait for the Retrieve node

use async_trait::async_trait;
use crate::error::Result;
use crate::types::Document;

/// Trait for indexed document retrieval
///
/// Implementations:
/// - `InMemoryDocumentStore`: term-overlap ranking over a JSON corpus
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Return at most `k` documents for `query`, best first
    async fn search(&self, query: &str, k: usize) -> Result<Vec<Document>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
