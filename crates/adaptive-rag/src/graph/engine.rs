//! Transition engine: runs one node at a time until a terminal edge

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use super::edges;
use super::guard::{Call, CallGuard, Halt, LoopGuard};
use super::node::{Node, Terminal, Transition};
use super::quality::QualityGate;
use crate::config::{GraphConfig, RagConfig, RetrievalConfig, RewriteBase};
use crate::error::{Error, RunFailure};
use crate::judgment::{
    AnswerGenerator, CompletenessChecker, HallucinationChecker, QueryRewriter, RelevanceGrader,
    Router,
};
use crate::providers::{DocumentStore, WebSearch};
use crate::types::{
    Completeness, EventDetail, Grounding, NoAnswerReason, Outcome, QueryState, Relevance,
    RouteDecision,
};

/// External collaborators the graph calls into
#[derive(Clone)]
pub struct Collaborators {
    pub router: Arc<dyn Router>,
    pub grader: Arc<dyn RelevanceGrader>,
    pub hallucination_checker: Arc<dyn HallucinationChecker>,
    pub completeness_checker: Arc<dyn CompletenessChecker>,
    pub rewriter: Arc<dyn QueryRewriter>,
    pub generator: Arc<dyn AnswerGenerator>,
    pub document_store: Arc<dyn DocumentStore>,
    pub web_search: Arc<dyn WebSearch>,
}

impl Collaborators {
    /// Use one judge for every judgment, rewrite and generation call
    pub fn from_judge<J>(
        judge: Arc<J>,
        document_store: Arc<dyn DocumentStore>,
        web_search: Arc<dyn WebSearch>,
    ) -> Self
    where
        J: Router
            + RelevanceGrader
            + HallucinationChecker
            + CompletenessChecker
            + QueryRewriter
            + AnswerGenerator
            + 'static,
    {
        Self {
            router: judge.clone(),
            grader: judge.clone(),
            hallucination_checker: judge.clone(),
            completeness_checker: judge.clone(),
            rewriter: judge.clone(),
            generator: judge,
            document_store,
            web_search,
        }
    }

    /// Swap the router, e.g. for the model-free keyword router
    pub fn with_router(mut self, router: Arc<dyn Router>) -> Self {
        self.router = router;
        self
    }
}

/// What one node execution produced
struct Step {
    detail: EventDetail,
    next: Transition,
}

type StepResult = std::result::Result<Step, Halt>;

/// The decision graph.
///
/// Holds only immutable configuration and shared collaborators; all per-run
/// data lives in a [`QueryState`] created by [`Orchestrator::run`], so one
/// orchestrator can serve concurrent runs without locking.
pub struct Orchestrator {
    graph: GraphConfig,
    retrieval: RetrievalConfig,
    guard: LoopGuard,
    debug: bool,
    collaborators: Collaborators,
}

impl Orchestrator {
    pub fn new(config: &RagConfig, collaborators: Collaborators) -> Self {
        Self {
            graph: config.graph.clone(),
            retrieval: config.retrieval.clone(),
            guard: LoopGuard::from_config(&config.graph),
            debug: config.debug,
            collaborators,
        }
    }

    pub fn graph_config(&self) -> &GraphConfig {
        &self.graph
    }

    pub fn loop_guard(&self) -> LoopGuard {
        self.guard
    }

    /// Answer `question`, or explain why there is no answer
    pub async fn run(&self, question: &str) -> std::result::Result<Outcome, RunFailure> {
        self.run_with_cancellation(question, CancellationToken::new())
            .await
    }

    /// Like [`Orchestrator::run`]; cancelling `cancel` stops the run at the
    /// next transition and abandons any in-flight call.
    pub async fn run_with_cancellation(
        &self,
        question: &str,
        cancel: CancellationToken,
    ) -> std::result::Result<Outcome, RunFailure> {
        let question = validate_question(question)?;
        let span = tracing::info_span!("run", run_id = %Uuid::new_v4());
        self.execute(question, cancel).instrument(span).await
    }

    async fn execute(
        &self,
        question: String,
        cancel: CancellationToken,
    ) -> std::result::Result<Outcome, RunFailure> {
        let calls = CallGuard::new(self.graph.per_call_timeout(), cancel);
        let mut state = QueryState::new(question);
        let mut node = Node::INITIAL;

        tracing::info!(question = state.question(), "Starting run");

        loop {
            if calls.is_cancelled() {
                return Ok(self.finish(Terminal::NoAnswer(NoAnswerReason::Cancelled), state));
            }

            tracing::info!(%node, "Entering node");
            let started = Instant::now();
            let result = match node {
                Node::Route => self.route(&mut state, &calls).await,
                Node::Retrieve => self.retrieve(&mut state, &calls).await,
                Node::Search => self.search(&mut state, &calls).await,
                Node::Grade => self.grade(&mut state, &calls).await,
                Node::Generate => self.generate(&mut state, &calls).await,
                Node::QualityCheck => self.quality_check(&mut state, &calls).await,
                Node::Rewrite => self.rewrite(&mut state, &calls).await,
            };
            let elapsed_ms = started.elapsed().as_millis() as u64;

            match result {
                Ok(Step { detail, next }) => {
                    state.record(node, detail, elapsed_ms);
                    if self.debug {
                        log_state(&state);
                    }
                    match next {
                        Transition::Goto(Node::Generate) if node == Node::QualityCheck => {
                            state.count_regenerate();
                            node = Node::Generate;
                        }
                        Transition::Goto(next) => node = next,
                        Transition::Done(terminal) => return Ok(self.finish(terminal, state)),
                    }
                }
                Err(Halt::Cancelled) => {
                    return Ok(self.finish(Terminal::NoAnswer(NoAnswerReason::Cancelled), state));
                }
                Err(Halt::Failed(error)) => {
                    tracing::error!(%node, %error, "Run failed");
                    state.record(
                        node,
                        EventDetail::Failed {
                            detail: error.to_string(),
                        },
                        elapsed_ms,
                    );
                    return Err(RunFailure::new(error, state.into_trace()));
                }
            }
        }
    }

    fn finish(&self, terminal: Terminal, state: QueryState) -> Outcome {
        match terminal {
            Terminal::Answered(verified) => {
                tracing::info!(
                    steps = state.history().len(),
                    loop_count = state.loop_count(),
                    "Run answered"
                );
                Outcome::answered(verified, state)
            }
            Terminal::NoAnswer(reason) => {
                tracing::info!(
                    steps = state.history().len(),
                    loop_count = state.loop_count(),
                    %reason,
                    "Run ended without an answer"
                );
                Outcome::no_answer(reason, state)
            }
        }
    }

    async fn route(&self, state: &mut QueryState, calls: &CallGuard) -> StepResult {
        let call = calls
            .call(Node::Route, self.collaborators.router.route(state.question()))
            .await?;
        let (decision, timed_out) = call.or_negative(RouteDecision::no_retrieval());

        state.set_route(decision.source());
        tracing::info!(%decision, "Routed question");

        Ok(Step {
            detail: EventDetail::Routed {
                decision,
                timed_out,
            },
            next: edges::after_route(&decision),
        })
    }

    async fn retrieve(&self, state: &mut QueryState, calls: &CallGuard) -> StepResult {
        let store = &self.collaborators.document_store;
        let call = calls
            .call(Node::Retrieve, store.search(state.question(), self.retrieval.k))
            .await?;
        let (documents, timed_out) = call.or_negative(Vec::new());

        tracing::info!(count = documents.len(), store = store.name(), "Retrieved documents");
        let count = documents.len();
        state.replace_documents(documents);

        Ok(Step {
            detail: EventDetail::Retrieved { count, timed_out },
            next: edges::after_fetch(),
        })
    }

    async fn search(&self, state: &mut QueryState, calls: &CallGuard) -> StepResult {
        let web = &self.collaborators.web_search;
        let call = calls.call(Node::Search, web.search(state.question())).await?;
        let (documents, timed_out) = call.or_negative(Vec::new());

        tracing::info!(count = documents.len(), backend = web.name(), "Web search finished");
        let count = documents.len();
        state.replace_documents(documents);

        Ok(Step {
            detail: EventDetail::Searched { count, timed_out },
            next: edges::after_fetch(),
        })
    }

    /// Grades documents concurrently; results are merged in retrieval order
    async fn grade(&self, state: &mut QueryState, calls: &CallGuard) -> StepResult {
        let documents = state.documents().to_vec();
        let question = state.question();
        let grader = &self.collaborators.grader;

        let verdicts: Vec<std::result::Result<Call<Relevance>, Halt>> = stream::iter(
            documents
                .iter()
                .map(|doc| calls.call(Node::Grade, grader.grade(question, doc)))
                .collect::<Vec<_>>(),
        )
        .buffered(self.graph.grading_concurrency.max(1))
            .collect()
            .await;

        let mut relevant = Vec::new();
        let mut timed_out = 0;
        for (doc, verdict) in documents.iter().zip(verdicts) {
            let (relevance, late) = verdict?.or_negative(Relevance::NotRelevant);
            if late {
                timed_out += 1;
            }
            tracing::debug!(
                source = doc.source_id(),
                snippet = %doc.snippet(60),
                ?relevance,
                "Graded document"
            );
            if relevance.is_relevant() {
                relevant.push(doc.clone());
            }
        }

        let total = documents.len();
        let relevant_count = relevant.len();
        tracing::info!(relevant = relevant_count, total, "Graded documents");
        state.set_relevant_documents(relevant);

        Ok(Step {
            detail: EventDetail::Graded {
                relevant: relevant_count,
                total,
                timed_out,
            },
            next: edges::after_grade(relevant_count),
        })
    }

    async fn generate(&self, state: &mut QueryState, calls: &CallGuard) -> StepResult {
        let call = calls
            .call(
                Node::Generate,
                self.collaborators
                    .generator
                    .generate(state.question(), state.relevant_documents()),
            )
            .await?;
        let (generation, timed_out) = match call {
            Call::Done(generation) => (Some(generation), false),
            Call::TimedOut => (None, true),
        };

        let chars = generation.as_ref().map_or(0, |g| g.chars().count());
        state.record_generation(generation);

        Ok(Step {
            detail: EventDetail::Generated {
                chars,
                attempt: state.generate_attempts(),
                timed_out,
            },
            next: edges::after_generate(),
        })
    }

    /// Hallucination check first; completeness only for a grounded answer
    async fn quality_check(&self, state: &mut QueryState, calls: &CallGuard) -> StepResult {
        let Some(generation) = state.generation().map(str::to_string) else {
            let assessment = QualityGate::missing_generation();
            return Ok(Step {
                detail: EventDetail::QualityChecked {
                    verdict: assessment.verdict(),
                    timed_out: true,
                },
                next: edges::after_quality(assessment, state.regenerate_count(), &self.guard),
            });
        };

        let call = calls
            .call(
                Node::QualityCheck,
                self.collaborators
                    .hallucination_checker
                    .check_grounding(state.relevant_documents(), &generation),
            )
            .await?;
        let (grounding, mut timed_out) = call.or_negative(Grounding::Hallucinated);

        let completeness = if grounding == Grounding::Grounded {
            let call = calls
                .call(
                    Node::QualityCheck,
                    self.collaborators
                        .completeness_checker
                        .check_completeness(state.original_question(), &generation),
                )
                .await?;
            let (completeness, late) = call.or_negative(Completeness::Incomplete);
            timed_out |= late;
            Some(completeness)
        } else {
            None
        };

        let assessment = QualityGate::assess(&generation, grounding, completeness);
        let verdict = assessment.verdict();
        tracing::info!(%verdict, regenerate_count = state.regenerate_count(), "Quality check");

        Ok(Step {
            detail: EventDetail::QualityChecked { verdict, timed_out },
            next: edges::after_quality(assessment, state.regenerate_count(), &self.guard),
        })
    }

    async fn rewrite(&self, state: &mut QueryState, calls: &CallGuard) -> StepResult {
        if let Some(done) = edges::rewrite_limit(state.loop_count(), &self.guard) {
            tracing::warn!(
                loop_count = state.loop_count(),
                max_loops = self.guard.max_loops(),
                "Loop limit reached"
            );
            return Ok(Step {
                detail: EventDetail::LoopLimitReached {
                    loop_count: state.loop_count(),
                },
                next: done,
            });
        }

        let base = match self.graph.rewrite_base {
            RewriteBase::Current => state.question(),
            RewriteBase::Original => state.original_question(),
        }
        .to_string();

        let call = calls
            .call(Node::Rewrite, self.collaborators.rewriter.rewrite(&base))
            .await?;
        let (rewritten, timed_out) = call.or_negative(state.question().to_string());

        if rewritten == base {
            tracing::debug!("Rewriter returned the question unchanged");
        }
        tracing::info!(from = %base, to = %rewritten, "Rewrote question");
        state.apply_rewrite(rewritten.clone());

        Ok(Step {
            detail: EventDetail::Rewritten {
                question: rewritten,
                loop_count: state.loop_count(),
                timed_out,
            },
            next: edges::after_rewrite(),
        })
    }
}

/// Fail fast on questions the graph cannot start with
fn validate_question(question: &str) -> std::result::Result<String, Error> {
    let trimmed = question.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_input("question must not be empty"));
    }
    if trimmed.chars().any(|c| c.is_control() && !c.is_whitespace()) {
        return Err(Error::invalid_input("question contains control characters"));
    }
    Ok(trimmed.to_string())
}

fn log_state(state: &QueryState) {
    tracing::info!(
        question = state.question(),
        documents = state.documents().len(),
        relevant = state.relevant_documents().len(),
        has_generation = state.generation().is_some(),
        loop_count = state.loop_count(),
        regenerate_count = state.regenerate_count(),
        "State"
    );
}
