//! Provider abstractions for the LLM, the document store and web search

pub mod document_store;
pub mod llm;
pub mod memory;
pub mod ollama;
pub mod tavily;
pub mod web_search;

use std::sync::Arc;

use crate::config::{RagConfig, WebSearchBackend};
use crate::error::Result;

pub use document_store::DocumentStore;
pub use llm::{CompletionRequest, LlmProvider, ResponseFormat};
pub use memory::InMemoryDocumentStore;
pub use ollama::OllamaClient;
pub use tavily::TavilySearch;
pub use web_search::{DisabledWebSearch, WebSearch};

/// Build the configured web search backend
pub fn web_search_from_config(config: &RagConfig) -> Result<Arc<dyn WebSearch>> {
    match config.web_search.backend {
        WebSearchBackend::Tavily => Ok(Arc::new(TavilySearch::new(
            &config.web_search,
            &config.retrieval,
        )?)),
        WebSearchBackend::Disabled => Ok(Arc::new(DisabledWebSearch)),
    }
}

/// Build the document store, loading the corpus when one is configured
pub fn document_store_from_config(config: &RagConfig) -> Result<Arc<dyn DocumentStore>> {
    match &config.retrieval.corpus_path {
        Some(path) => Ok(Arc::new(InMemoryDocumentStore::from_json_file(path)?)),
        None => {
            tracing::warn!("No corpus configured, the document store is empty");
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
    }
}
