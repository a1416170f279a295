//! Model-backed implementation of every judgment function

use async_trait::async_trait;
use std::sync::Arc;

use super::parse;
use super::prompt::PromptBuilder;
use super::{
    AnswerGenerator, CompletenessChecker, HallucinationChecker, QueryRewriter, RelevanceGrader,
    Router,
};
use crate::config::RouterConfig;
use crate::error::Result;
use crate::graph::Node;
use crate::providers::{CompletionRequest, LlmProvider};
use crate::types::{Completeness, Document, Grounding, Relevance, RouteDecision};

/// Routes, grades, rewrites and generates through one LLM provider
pub struct LlmJudge {
    provider: Arc<dyn LlmProvider>,
    topics: Vec<String>,
}

impl LlmJudge {
    pub fn new(provider: Arc<dyn LlmProvider>, config: &RouterConfig) -> Self {
        Self {
            provider,
            topics: config.indexed_topics.clone(),
        }
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }
}

#[async_trait]
impl Router for LlmJudge {
    async fn route(&self, question: &str) -> Result<RouteDecision> {
        let raw = self
            .provider
            .complete(CompletionRequest::json(
                PromptBuilder::router_system(&self.topics),
                question,
            ))
            .await?;
        parse::parse_route(&raw)
    }
}

#[async_trait]
impl RelevanceGrader for LlmJudge {
    async fn grade(&self, question: &str, document: &Document) -> Result<Relevance> {
        let raw = self
            .provider
            .complete(CompletionRequest::json(
                PromptBuilder::grader_system(),
                PromptBuilder::grader_prompt(question, document),
            ))
            .await?;
        Ok(if parse::parse_binary(Node::Grade, &raw)? {
            Relevance::Relevant
        } else {
            Relevance::NotRelevant
        })
    }
}

#[async_trait]
impl HallucinationChecker for LlmJudge {
    async fn check_grounding(&self, documents: &[Document], generation: &str) -> Result<Grounding> {
        let raw = self
            .provider
            .complete(CompletionRequest::json(
                PromptBuilder::hallucination_system(),
                PromptBuilder::hallucination_prompt(documents, generation),
            ))
            .await?;
        Ok(if parse::parse_binary(Node::QualityCheck, &raw)? {
            Grounding::Grounded
        } else {
            Grounding::Hallucinated
        })
    }
}

#[async_trait]
impl CompletenessChecker for LlmJudge {
    async fn check_completeness(&self, question: &str, generation: &str) -> Result<Completeness> {
        let raw = self
            .provider
            .complete(CompletionRequest::json(
                PromptBuilder::answer_system(),
                PromptBuilder::answer_prompt(question, generation),
            ))
            .await?;
        Ok(if parse::parse_binary(Node::QualityCheck, &raw)? {
            Completeness::Complete
        } else {
            Completeness::Incomplete
        })
    }
}

#[async_trait]
impl QueryRewriter for LlmJudge {
    async fn rewrite(&self, question: &str) -> Result<String> {
        let raw = self
            .provider
            .complete(CompletionRequest::text(
                PromptBuilder::rewriter_system(),
                PromptBuilder::rewriter_prompt(question),
            ))
            .await?;
        parse::clean_rewrite(&raw)
    }
}

#[async_trait]
impl AnswerGenerator for LlmJudge {
    async fn generate(&self, question: &str, documents: &[Document]) -> Result<String> {
        tracing::info!(
            "Generating answer with {} ({}) from {} documents",
            self.provider.name(),
            self.provider.model(),
            documents.len()
        );
        let raw = self
            .provider
            .complete(CompletionRequest::text(
                PromptBuilder::generator_system(),
                PromptBuilder::generator_prompt(question, documents),
            ))
            .await?;
        parse::clean_generation(&raw)
    }
}
