//! Application state for the HTTP shell

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::graph::Orchestrator;
use crate::pipeline::Pipeline;
use crate::providers::LlmProvider;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Decision graph shared by all requests
    orchestrator: Arc<Orchestrator>,
    /// LLM provider, probed by the readiness check
    llm: Option<Arc<dyn LlmProvider>>,
}

impl AppState {
    /// Build the full pipeline from `config`
    pub fn new(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing adaptive RAG application state...");
        let pipeline = Pipeline::from_config(&config)?;
        Ok(Self::from_parts(config, pipeline.orchestrator, Some(pipeline.llm)))
    }

    /// Wrap an already built orchestrator
    pub fn from_parts(
        config: RagConfig,
        orchestrator: Arc<Orchestrator>,
        llm: Option<Arc<dyn LlmProvider>>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                orchestrator,
                llm,
            }),
        }
    }

    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.inner.orchestrator
    }

    /// Ready when the LLM provider answers its health probe
    pub async fn is_ready(&self) -> bool {
        match &self.inner.llm {
            Some(llm) => llm.health_check().await.unwrap_or(false),
            None => true,
        }
    }
}
