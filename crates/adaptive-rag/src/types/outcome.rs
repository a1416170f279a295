//! Terminal result of a graph run

use serde::{Deserialize, Serialize};
use std::fmt;

use super::state::QueryState;
use super::trace::Trace;
use super::verdict::Source;
use crate::graph::VerifiedGeneration;

/// Why a run ended without an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoAnswerReason {
    NotRetrievalNeeded,
    MaxLoopsExceeded,
    Cancelled,
}

impl fmt::Display for NoAnswerReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            NoAnswerReason::NotRetrievalNeeded => "question does not need retrieval",
            NoAnswerReason::MaxLoopsExceeded => "rewrite loop limit exceeded",
            NoAnswerReason::Cancelled => "run cancelled",
        };
        f.write_str(text)
    }
}

/// A verified answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    answer: String,
    question: String,
    original_question: String,
    route_taken: Source,
    loop_count: u32,
    trace: Trace,
}

/// A deliberate non-answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoAnswer {
    no_answer: bool,
    reason: NoAnswerReason,
    route_taken: Source,
    loop_count: u32,
    trace: Trace,
}

impl Answer {
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Question in effect when the answer passed, after any rewrites
    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn original_question(&self) -> &str {
        &self.original_question
    }

    /// Source chosen by the last Route step
    pub fn route_taken(&self) -> Source {
        self.route_taken
    }

    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }
}

impl NoAnswer {
    pub fn reason(&self) -> NoAnswerReason {
        self.reason
    }

    pub fn route_taken(&self) -> Source {
        self.route_taken
    }

    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }
}

/// Result of `Orchestrator::run`.
///
/// `Answered` can only be built from a generation that passed the quality
/// check, so a run never returns an answer that skipped verification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Answered(Answer),
    NoAnswer(NoAnswer),
}

impl Outcome {
    pub(crate) fn answered(verified: VerifiedGeneration, state: QueryState) -> Self {
        let question = state.question().to_string();
        let original_question = state.original_question().to_string();
        let loop_count = state.loop_count();
        Outcome::Answered(Answer {
            answer: verified.into_inner(),
            question,
            original_question,
            route_taken: state.route_taken(),
            loop_count,
            trace: state.into_trace(),
        })
    }

    pub(crate) fn no_answer(reason: NoAnswerReason, state: QueryState) -> Self {
        let loop_count = state.loop_count();
        Outcome::NoAnswer(NoAnswer {
            no_answer: true,
            reason,
            route_taken: state.route_taken(),
            loop_count,
            trace: state.into_trace(),
        })
    }

    pub fn answer(&self) -> Option<&str> {
        match self {
            Outcome::Answered(a) => Some(&a.answer),
            Outcome::NoAnswer(_) => None,
        }
    }

    pub fn no_answer_reason(&self) -> Option<NoAnswerReason> {
        match self {
            Outcome::Answered(_) => None,
            Outcome::NoAnswer(n) => Some(n.reason),
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, Outcome::Answered(_))
    }

    pub fn trace(&self) -> &Trace {
        match self {
            Outcome::Answered(a) => &a.trace,
            Outcome::NoAnswer(n) => &n.trace,
        }
    }

    /// Source chosen by the last Route step
    pub fn route_taken(&self) -> Source {
        match self {
            Outcome::Answered(a) => a.route_taken,
            Outcome::NoAnswer(n) => n.route_taken,
        }
    }

    pub fn loop_count(&self) -> u32 {
        match self {
            Outcome::Answered(a) => a.loop_count,
            Outcome::NoAnswer(n) => n.loop_count,
        }
    }

    /// Question the answer was produced for (after any rewrites)
    pub fn answered_question(&self) -> Option<&str> {
        match self {
            Outcome::Answered(a) => Some(&a.question),
            Outcome::NoAnswer(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_answer_serializes_flat() {
        let outcome = Outcome::no_answer(NoAnswerReason::MaxLoopsExceeded, QueryState::new("q"));
        let value = serde_json::to_value(&outcome).unwrap();

        assert_eq!(value["no_answer"], true);
        assert_eq!(value["reason"], "max_loops_exceeded");
        assert_eq!(value["loop_count"], 0);
        assert_eq!(value["route_taken"], "none");
        assert!(value["trace"].as_array().unwrap().is_empty());
        assert!(outcome.answer().is_none());
    }
}
