//! Wiring of the configured providers into a ready orchestrator

use std::sync::Arc;

use crate::config::{RagConfig, RouterMode};
use crate::error::Result;
use crate::graph::{Collaborators, Orchestrator};
use crate::judgment::{KeywordRouter, LlmJudge};
use crate::providers::{self, LlmProvider, OllamaClient};

/// An orchestrator plus the LLM provider behind it
#[derive(Clone)]
pub struct Pipeline {
    pub orchestrator: Arc<Orchestrator>,
    pub llm: Arc<dyn LlmProvider>,
}

impl Pipeline {
    /// Validate `config` and build every collaborator it names
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        config.validate()?;

        let llm: Arc<dyn LlmProvider> = Arc::new(OllamaClient::new(&config.llm)?);
        tracing::info!(
            "LLM provider: {} (model: {})",
            llm.name(),
            llm.model()
        );

        Self::with_llm(config, llm)
    }

    /// Build around an existing LLM provider
    pub fn with_llm(config: &RagConfig, llm: Arc<dyn LlmProvider>) -> Result<Self> {
        let document_store = providers::document_store_from_config(config)?;
        let web_search = providers::web_search_from_config(config)?;
        tracing::info!(
            "Document store: {}, web search: {}",
            document_store.name(),
            web_search.name()
        );

        let judge = Arc::new(LlmJudge::new(llm.clone(), &config.router));
        let mut collaborators = Collaborators::from_judge(judge, document_store, web_search);

        if config.router.mode == RouterMode::Keyword {
            tracing::info!("Using keyword router");
            collaborators = collaborators.with_router(Arc::new(KeywordRouter::new(&config.router)?));
        }

        Ok(Self {
            orchestrator: Arc::new(Orchestrator::new(config, collaborators)),
            llm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WebSearchBackend;
    use crate::error::Error;

    #[test]
    fn test_default_config_builds() {
        let pipeline = Pipeline::from_config(&RagConfig::default()).unwrap();
        assert_eq!(pipeline.llm.name(), "ollama");
        assert_eq!(pipeline.orchestrator.loop_guard().max_loops(), 3);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = RagConfig::default();
        config.web_search.backend = WebSearchBackend::Tavily;
        assert!(matches!(Pipeline::from_config(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_keyword_router_with_missing_corpus() {
        let mut config = RagConfig::default();
        config.router.mode = RouterMode::Keyword;
        config.retrieval.corpus_path = Some("/nonexistent/corpus.json".to_string());
        assert!(matches!(Pipeline::from_config(&config), Err(Error::Io(_))));
    }
}
