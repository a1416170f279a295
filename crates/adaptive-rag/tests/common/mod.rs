//! Scripted collaborators for driving the graph in tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use adaptive_rag::config::RagConfig;
use adaptive_rag::error::{Error, Result};
use adaptive_rag::judgment::{
    AnswerGenerator, CompletenessChecker, HallucinationChecker, QueryRewriter, RelevanceGrader,
    Router,
};
use adaptive_rag::providers::{DocumentStore, WebSearch};
use adaptive_rag::types::{Completeness, Grounding, Relevance, RouteDecision};
use adaptive_rag::{Collaborators, Document, Node, Orchestrator};
use async_trait::async_trait;
use parking_lot::Mutex;

/// One scripted reply
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Value(T),
    /// Reply after a delay, e.g. past the per-call timeout
    Slow(Duration, T),
    /// Out-of-shape output
    Violation(Node, &'static str),
    /// Transport failure after the client gave up, e.g. the LLM is down
    Unavailable(&'static str),
    /// Never reply
    Hang,
}

/// Replies from a queue, then a fallback forever
pub struct Script<T> {
    queue: Mutex<VecDeque<Reply<T>>>,
    fallback: Reply<T>,
    calls: AtomicUsize,
}

impl<T: Clone> Script<T> {
    pub fn always(value: T) -> Self {
        Self::replying(Reply::Value(value))
    }

    pub fn replying(fallback: Reply<T>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue `value` ahead of the fallback
    pub fn then(self, value: T) -> Self {
        self.then_reply(Reply::Value(value))
    }

    pub fn then_reply(self, reply: Reply<T>) -> Self {
        self.queue.lock().push_back(reply);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn next(&self) -> Result<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .queue
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        resolve(reply).await
    }
}

async fn resolve<T>(reply: Reply<T>) -> Result<T> {
    match reply {
        Reply::Value(value) => Ok(value),
        Reply::Slow(delay, value) => {
            tokio::time::sleep(delay).await;
            Ok(value)
        }
        Reply::Violation(node, detail) => Err(Error::contract(node, detail)),
        Reply::Unavailable(detail) => Err(Error::llm(detail)),
        Reply::Hang => std::future::pending().await,
    }
}

/// Every collaborator of the graph, scripted
pub struct Fakes {
    pub route: Script<RouteDecision>,
    pub retrieve: Script<Vec<Document>>,
    pub search: Script<Vec<Document>>,
    /// Source ids graded relevant; everything else is not relevant
    pub relevant: Mutex<HashSet<String>>,
    /// Per-source grading replies that override `relevant`
    pub grade_overrides: HashMap<String, Reply<Relevance>>,
    pub grounding: Script<Grounding>,
    pub completeness: Script<Completeness>,
    pub rewrite: Script<String>,
    pub generate: Script<String>,
    /// Questions the rewriter received
    pub rewrite_inputs: Mutex<Vec<String>>,
    /// (question, document sources) per generate call
    pub generate_inputs: Mutex<Vec<(String, Vec<String>)>>,
    /// Questions the completeness checker received
    pub completeness_inputs: Mutex<Vec<String>>,
    pub grade_calls: AtomicUsize,
}

impl Default for Fakes {
    fn default() -> Self {
        Self {
            route: Script::always(RouteDecision::vector_store()),
            retrieve: Script::always(docs(&["d1", "d2"])),
            search: Script::always(docs(&["w1"])),
            relevant: Mutex::new(["d1", "d2", "w1"].iter().map(|s| s.to_string()).collect()),
            grade_overrides: HashMap::new(),
            grounding: Script::always(Grounding::Grounded),
            completeness: Script::always(Completeness::Complete),
            rewrite: Script::always("rewritten question".to_string()),
            generate: Script::always("generated answer".to_string()),
            rewrite_inputs: Mutex::new(Vec::new()),
            generate_inputs: Mutex::new(Vec::new()),
            completeness_inputs: Mutex::new(Vec::new()),
            grade_calls: AtomicUsize::new(0),
        }
    }
}

impl Fakes {
    pub fn with_relevant(self, sources: &[&str]) -> Self {
        *self.relevant.lock() = sources.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn grade_calls(&self) -> usize {
        self.grade_calls.load(Ordering::SeqCst)
    }
}

/// Documents whose source id doubles as content
pub fn docs(sources: &[&str]) -> Vec<Document> {
    sources
        .iter()
        .map(|s| Document::new(format!("content of {}", s), *s))
        .collect()
}

#[async_trait]
impl Router for Fakes {
    async fn route(&self, _question: &str) -> Result<RouteDecision> {
        self.route.next().await
    }
}

#[async_trait]
impl RelevanceGrader for Fakes {
    async fn grade(&self, _question: &str, document: &Document) -> Result<Relevance> {
        self.grade_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reply) = self.grade_overrides.get(document.source_id()) {
            return resolve(reply.clone()).await;
        }
        Ok(if self.relevant.lock().contains(document.source_id()) {
            Relevance::Relevant
        } else {
            Relevance::NotRelevant
        })
    }
}

#[async_trait]
impl HallucinationChecker for Fakes {
    async fn check_grounding(&self, _documents: &[Document], _generation: &str) -> Result<Grounding> {
        self.grounding.next().await
    }
}

#[async_trait]
impl CompletenessChecker for Fakes {
    async fn check_completeness(&self, question: &str, _generation: &str) -> Result<Completeness> {
        self.completeness_inputs.lock().push(question.to_string());
        self.completeness.next().await
    }
}

#[async_trait]
impl QueryRewriter for Fakes {
    async fn rewrite(&self, question: &str) -> Result<String> {
        self.rewrite_inputs.lock().push(question.to_string());
        self.rewrite.next().await
    }
}

#[async_trait]
impl AnswerGenerator for Fakes {
    async fn generate(&self, question: &str, documents: &[Document]) -> Result<String> {
        self.generate_inputs.lock().push((
            question.to_string(),
            documents.iter().map(|d| d.source_id().to_string()).collect(),
        ));
        self.generate.next().await
    }
}

#[async_trait]
impl DocumentStore for Fakes {
    async fn search(&self, _query: &str, _k: usize) -> Result<Vec<Document>> {
        self.retrieve.next().await
    }

    fn name(&self) -> &str {
        "scripted-store"
    }
}

#[async_trait]
impl WebSearch for Fakes {
    async fn search(&self, _query: &str) -> Result<Vec<Document>> {
        self.search.next().await
    }

    fn name(&self) -> &str {
        "scripted-web"
    }
}

pub fn config() -> RagConfig {
    RagConfig::default()
}

/// Orchestrator over `fakes` with `config`
pub fn orchestrator_with(fakes: Fakes, config: &RagConfig) -> (Arc<Fakes>, Orchestrator) {
    let fakes = Arc::new(fakes);
    let collaborators = Collaborators::from_judge(fakes.clone(), fakes.clone(), fakes.clone());
    (fakes, Orchestrator::new(config, collaborators))
}

pub fn orchestrator(fakes: Fakes) -> (Arc<Fakes>, Orchestrator) {
    orchestrator_with(fakes, &config())
}
