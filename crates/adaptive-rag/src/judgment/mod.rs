//! Judgment functions the graph consults at each decision point
//!
//! Every collaborator is a trait object so the graph can run against a
//! model-backed judge, a heuristic router, or scripted fakes in tests.
//! Implementations return well-formed verdicts or an error; a value outside
//! the declared shape is reported as [`crate::Error::UpstreamContractViolation`].

mod keyword;
mod llm;
mod parse;
mod prompt;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Completeness, Document, Grounding, Relevance, RouteDecision};

pub use keyword::KeywordRouter;
pub use llm::LlmJudge;
pub use prompt::PromptBuilder;

/// Decides whether a question needs evidence, and from where
#[async_trait]
pub trait Router: Send + Sync {
    async fn route(&self, question: &str) -> Result<RouteDecision>;
}

/// Judges whether one document bears on the question
#[async_trait]
pub trait RelevanceGrader: Send + Sync {
    async fn grade(&self, question: &str, document: &Document) -> Result<Relevance>;
}

/// Judges whether a generation is supported by the documents
#[async_trait]
pub trait HallucinationChecker: Send + Sync {
    async fn check_grounding(&self, documents: &[Document], generation: &str) -> Result<Grounding>;
}

/// Judges whether a generation answers the question
#[async_trait]
pub trait CompletenessChecker: Send + Sync {
    async fn check_completeness(&self, question: &str, generation: &str) -> Result<Completeness>;
}

/// Reformulates a question for better retrieval
#[async_trait]
pub trait QueryRewriter: Send + Sync {
    async fn rewrite(&self, question: &str) -> Result<String>;
}

/// Produces an answer from the question and the relevant documents
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, question: &str, documents: &[Document]) -> Result<String>;
}
