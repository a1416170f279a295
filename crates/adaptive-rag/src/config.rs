//! Configuration for the adaptive RAG pipeline

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Main configuration, read-only once the orchestrator is built
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Loop guards and per-call budgets
    #[serde(default)]
    pub graph: GraphConfig,
    /// Document store and web search sizing
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Ollama/LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Web search backend
    #[serde(default)]
    pub web_search: WebSearchConfig,
    /// Heuristic router topics
    #[serde(default)]
    pub router: RouterConfig,
    /// HTTP shell configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Verbose node-level logging
    #[serde(default)]
    pub debug: bool,
}

impl RagConfig {
    /// Load from a TOML file; missing sections fall back to defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&raw)
    }

    /// File (when given) or defaults, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env_overrides()
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply environment overrides on top of the loaded values
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (the environment in production)
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ADAPTIVE_RAG_MAX_LOOPS") {
            self.graph.max_loops = parse_env("ADAPTIVE_RAG_MAX_LOOPS", &v)?;
        }
        if let Some(v) = lookup("ADAPTIVE_RAG_MAX_REGENERATE_RETRIES") {
            self.graph.max_regenerate_retries = parse_env("ADAPTIVE_RAG_MAX_REGENERATE_RETRIES", &v)?;
        }
        if let Some(v) = lookup("ADAPTIVE_RAG_CALL_TIMEOUT_SECS") {
            self.graph.per_call_timeout_secs = parse_env("ADAPTIVE_RAG_CALL_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("OLLAMA_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Some(v) = lookup("ADAPTIVE_RAG_MODEL") {
            self.llm.model = v;
        }
        if let Some(v) = lookup("TAVILY_API_KEY") {
            if !v.trim().is_empty() {
                self.web_search.api_key = Some(v);
            }
        }
        if let Some(v) = lookup("ADAPTIVE_RAG_WEB_SEARCH") {
            self.web_search.backend = match v.trim().to_ascii_lowercase().as_str() {
                "tavily" => WebSearchBackend::Tavily,
                "disabled" | "none" => WebSearchBackend::Disabled,
                other => {
                    return Err(Error::Config(format!(
                        "ADAPTIVE_RAG_WEB_SEARCH has an invalid value: {:?}",
                        other
                    )))
                }
            };
        }
        if let Some(v) = lookup("ADAPTIVE_RAG_CORPUS") {
            self.retrieval.corpus_path = Some(v);
        }
        if let Some(v) = lookup("ADAPTIVE_RAG_DEBUG") {
            self.debug = v.eq_ignore_ascii_case("true") || v == "1";
        }
        Ok(self)
    }

    /// Reject settings the graph cannot run with
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.graph.max_loops == 0 {
            errors.push("graph.max_loops must be at least 1");
        }
        if self.graph.per_call_timeout_secs == 0 {
            errors.push("graph.per_call_timeout_secs must be positive");
        }
        if self.graph.grading_concurrency == 0 {
            errors.push("graph.grading_concurrency must be at least 1");
        }
        if self.retrieval.k == 0 {
            errors.push("retrieval.k must be at least 1");
        }
        if self.llm.timeout_secs == 0 {
            errors.push("llm.timeout_secs must be positive");
        }
        if self.web_search.backend == WebSearchBackend::Tavily
            && self.web_search.api_key.as_deref().map_or(true, |k| k.trim().is_empty())
        {
            errors.push("web_search.api_key (TAVILY_API_KEY) is required for the tavily backend");
        }

        for warning in self.warnings() {
            tracing::warn!("{}", warning);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(errors.join("; ")))
        }
    }

    /// Settings that run, but not as intended
    pub fn warnings(&self) -> Vec<String> {
        let budget = self.graph.per_call_timeout_secs;
        let mut warnings = Vec::new();

        if self.llm.timeout_secs >= budget {
            warnings.push(format!(
                "llm.timeout_secs ({}) is not below graph.per_call_timeout_secs ({}); \
                 slow LLM calls time out in the graph before the client retries them",
                self.llm.timeout_secs, budget
            ));
        }
        if self.web_search.backend == WebSearchBackend::Tavily && self.web_search.timeout_secs > budget {
            warnings.push(format!(
                "web_search.timeout_secs ({}) exceeds graph.per_call_timeout_secs ({})",
                self.web_search.timeout_secs, budget
            ));
        }
        warnings
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} has an invalid value: {:?}", key, value)))
}

/// Which question the rewriter receives on repeated loops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewriteBase {
    /// The current, possibly already rewritten, question
    #[default]
    Current,
    /// Always the user's original question
    Original,
}

/// Loop guards and per-call budgets for the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Maximum rewrite-then-retrieve cycles (default: 3)
    #[serde(default = "default_max_loops")]
    pub max_loops: u32,
    /// Maximum regenerations after a hallucinated answer (default: 2)
    #[serde(default = "default_max_regenerate_retries")]
    pub max_regenerate_retries: u32,
    /// Budget for each external call in seconds (default: 30)
    #[serde(default = "default_per_call_timeout")]
    pub per_call_timeout_secs: u64,
    /// Documents graded concurrently (default: 4)
    #[serde(default = "default_grading_concurrency")]
    pub grading_concurrency: usize,
    /// Question handed to the rewriter
    #[serde(default)]
    pub rewrite_base: RewriteBase,
}

fn default_max_loops() -> u32 { 3 }
fn default_max_regenerate_retries() -> u32 { 2 }
fn default_per_call_timeout() -> u64 { 30 }
fn default_grading_concurrency() -> usize { 4 }

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_loops: 3,
            max_regenerate_retries: 2,
            per_call_timeout_secs: 30,
            grading_concurrency: 4,
            rewrite_base: RewriteBase::Current,
        }
    }
}

impl GraphConfig {
    pub fn per_call_timeout(&self) -> Duration {
        Duration::from_secs(self.per_call_timeout_secs)
    }
}

/// Retrieval sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Documents requested from the document store (default: 4)
    #[serde(default = "default_k")]
    pub k: usize,
    /// Results requested from web search (default: 3)
    #[serde(default = "default_web_search_k")]
    pub web_search_k: usize,
    /// JSON corpus loaded into the in-memory document store
    #[serde(default)]
    pub corpus_path: Option<String>,
}

fn default_k() -> usize { 4 }
fn default_web_search_k() -> usize { 3 }

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: 4,
            web_search_k: 3,
            corpus_path: None,
        }
    }
}

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Model used for every judgment, rewrite and generation
    pub model: String,
    /// Temperature (0.0 keeps verdicts deterministic)
    pub temperature: f32,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2:3b".to_string(),
            temperature: 0.0,
            timeout_secs: 20,
            max_retries: 2,
        }
    }
}

/// Web search backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebSearchBackend {
    /// Tavily search API
    Tavily,
    /// Web search disabled; searches return no documents
    #[default]
    Disabled,
}

/// Web search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSearchConfig {
    #[serde(default)]
    pub backend: WebSearchBackend,
    /// Tavily endpoint
    pub base_url: String,
    /// Tavily API key
    #[serde(default)]
    pub api_key: Option<String>,
    /// "basic" or "advanced"
    pub search_depth: String,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            backend: WebSearchBackend::Disabled,
            base_url: "https://api.tavily.com".to_string(),
            api_key: None,
            search_depth: "basic".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Which router implementation answers the Route node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouterMode {
    /// Ask the LLM for a datasource
    #[default]
    Llm,
    /// Regex scoring over the indexed topics, no model call
    Keyword,
}

/// Router selection and the topics served by the document store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub mode: RouterMode,
    pub indexed_topics: Vec<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            mode: RouterMode::Llm,
            indexed_topics: vec![
                "agents".to_string(),
                "prompt engineering".to_string(),
                "adversarial attacks".to_string(),
            ],
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_validate() {
        let config = RagConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.graph.max_loops, 3);
        assert_eq!(config.retrieval.k, 4);
        assert_eq!(config.retrieval.web_search_k, 3);
        assert_eq!(config.graph.rewrite_base, RewriteBase::Current);
    }

    #[test]
    fn test_defaults_leave_room_for_llm_retries() {
        let config = RagConfig::default();
        assert!(config.llm.timeout_secs < config.graph.per_call_timeout_secs);
        assert!(config.warnings().is_empty());
    }

    #[test]
    fn test_llm_timeout_over_call_budget_warns() {
        let mut config = RagConfig::default();
        config.llm.timeout_secs = 120;
        assert!(config.validate().is_ok());

        let warnings = config.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("llm.timeout_secs (120)"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RagConfig::from_toml(
            r#"
            [graph]
            max_loops = 5
            rewrite_base = "original"

            [retrieval]
            k = 6
            "#,
        )
        .unwrap();

        assert_eq!(config.graph.max_loops, 5);
        assert_eq!(config.graph.max_regenerate_retries, 2);
        assert_eq!(config.graph.rewrite_base, RewriteBase::Original);
        assert_eq!(config.retrieval.k, 6);
        assert_eq!(config.retrieval.web_search_k, 3);
        assert_eq!(config.llm.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_example_file_parses() {
        let config = RagConfig::from_toml(include_str!("../config.example.toml")).unwrap();
        assert_eq!(config.router.mode, RouterMode::Llm);
        assert_eq!(config.web_search.backend, WebSearchBackend::Disabled);
        assert_eq!(
            config.retrieval.corpus_path.as_deref(),
            Some("crates/adaptive-rag/data/corpus.json")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_router_and_backend_names() {
        let config = RagConfig::from_toml(
            r#"
            [router]
            mode = "keyword"

            [web_search]
            backend = "tavily"
            api_key = "tvly-x"
            "#,
        )
        .unwrap();
        assert_eq!(config.router.mode, RouterMode::Keyword);
        assert_eq!(config.router.indexed_topics.len(), 3);
        assert!(config.validate().is_ok());

        let config = RagConfig::default()
            .with_overrides(|k| (k == "ADAPTIVE_RAG_WEB_SEARCH").then(|| "tavily".to_string()))
            .unwrap();
        assert_eq!(config.web_search.backend, WebSearchBackend::Tavily);
    }

    #[test]
    fn test_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("ADAPTIVE_RAG_MAX_LOOPS", "1"),
            ("ADAPTIVE_RAG_CALL_TIMEOUT_SECS", "5"),
            ("TAVILY_API_KEY", "tvly-test"),
            ("ADAPTIVE_RAG_DEBUG", "TRUE"),
        ]
        .into_iter()
        .collect();

        let config = RagConfig::default()
            .with_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.graph.max_loops, 1);
        assert_eq!(config.graph.per_call_timeout(), Duration::from_secs(5));
        assert_eq!(config.web_search.api_key.as_deref(), Some("tvly-test"));
        assert!(config.debug);
    }

    #[test]
    fn test_bad_override_is_config_error() {
        let result = RagConfig::default().with_overrides(|k| {
            (k == "ADAPTIVE_RAG_MAX_LOOPS").then(|| "three".to_string())
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_loops_and_missing_key() {
        let mut config = RagConfig::default();
        config.graph.max_loops = 0;
        config.web_search.backend = WebSearchBackend::Tavily;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_loops"));
        assert!(err.contains("TAVILY_API_KEY"));
    }
}
