//! Per-run query state threaded through the graph

use super::document::Document;
use super::trace::{EventDetail, Trace};
use super::verdict::Source;
use crate::graph::Node;

/// State of a single graph execution.
///
/// Created fresh for each question and dropped when the run ends. Fields are
/// only changed through the narrow mutators below, so the append-only trace
/// and the two independent counters cannot be edited out of band.
#[derive(Debug, Clone)]
pub struct QueryState {
    question: String,
    original_question: String,
    /// Output of the most recent Retrieve or Search node, untouched by grading
    documents: Vec<Document>,
    /// Output of the most recent Grade node
    relevant_documents: Vec<Document>,
    generation: Option<String>,
    history: Trace,
    route_taken: Source,
    loop_count: u32,
    regenerate_count: u32,
    generate_attempts: u32,
}

impl QueryState {
    pub fn new(question: impl Into<String>) -> Self {
        let question = question.into();
        Self {
            original_question: question.clone(),
            question,
            documents: Vec::new(),
            relevant_documents: Vec::new(),
            generation: None,
            history: Trace::default(),
            route_taken: Source::None,
            loop_count: 0,
            regenerate_count: 0,
            generate_attempts: 0,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn original_question(&self) -> &str {
        &self.original_question
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn relevant_documents(&self) -> &[Document] {
        &self.relevant_documents
    }

    pub fn generation(&self) -> Option<&str> {
        self.generation.as_deref()
    }

    pub fn history(&self) -> &Trace {
        &self.history
    }

    pub fn route_taken(&self) -> Source {
        self.route_taken
    }

    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    pub fn regenerate_count(&self) -> u32 {
        self.regenerate_count
    }

    pub fn generate_attempts(&self) -> u32 {
        self.generate_attempts
    }

    pub(crate) fn set_route(&mut self, source: Source) {
        self.route_taken = source;
    }

    /// Replace the evidence wholesale with a fresh retrieval or search result
    pub(crate) fn replace_documents(&mut self, documents: Vec<Document>) {
        self.documents = documents;
        self.relevant_documents.clear();
    }

    /// Store the grading output and open a fresh regenerate budget for it
    pub(crate) fn set_relevant_documents(&mut self, relevant: Vec<Document>) {
        self.relevant_documents = relevant;
        self.regenerate_count = 0;
    }

    /// Record a Generate execution; `None` when the generator timed out
    pub(crate) fn record_generation(&mut self, generation: Option<String>) {
        self.generate_attempts += 1;
        self.generation = generation;
    }

    pub(crate) fn count_regenerate(&mut self) {
        self.regenerate_count += 1;
    }

    /// Apply a rewrite. The loop counts even when the question did not change.
    pub(crate) fn apply_rewrite(&mut self, question: String) {
        self.loop_count += 1;
        self.question = question;
    }

    pub(crate) fn record(&mut self, node: Node, detail: EventDetail, elapsed_ms: u64) {
        let event = self.history.push(node, detail, &self.question, elapsed_ms);
        tracing::debug!(step = event.step, node = %event.node, "{}", event.detail);
    }

    pub(crate) fn into_trace(self) -> Trace {
        self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_keeps_original_question() {
        let mut state = QueryState::new("agent stuff");
        state.apply_rewrite("What are the components of an LLM agent?".to_string());

        assert_eq!(state.original_question(), "agent stuff");
        assert_eq!(state.question(), "What are the components of an LLM agent?");
        assert_eq!(state.loop_count(), 1);
        assert!(state.generation().is_none());
    }

    #[test]
    fn test_unchanged_rewrite_still_counts() {
        let mut state = QueryState::new("agent stuff");
        state.apply_rewrite("agent stuff".to_string());
        state.apply_rewrite("agent stuff".to_string());
        assert_eq!(state.loop_count(), 2);
    }

    #[test]
    fn test_grading_does_not_touch_retrieved_documents() {
        let mut state = QueryState::new("q");
        state.replace_documents(vec![Document::new("a", "1"), Document::new("b", "2")]);
        state.set_relevant_documents(vec![Document::new("b", "2")]);

        assert_eq!(state.documents().len(), 2);
        assert_eq!(state.relevant_documents().len(), 1);

        state.replace_documents(vec![Document::new("c", "3")]);
        assert!(state.relevant_documents().is_empty());
    }

    #[test]
    fn test_regenerate_budget_resets_with_new_evidence() {
        let mut state = QueryState::new("q");
        state.count_regenerate();
        state.count_regenerate();
        assert_eq!(state.regenerate_count(), 2);

        state.set_relevant_documents(vec![Document::new("a", "1")]);
        assert_eq!(state.regenerate_count(), 0);
        assert_eq!(state.loop_count(), 0);
    }
}
