//! Conditional edges of the decision graph
//!
//! Pure functions from a node's verdict to the next node. The engine applies
//! any counter updates an edge implies.

use super::guard::LoopGuard;
use super::node::{Node, Terminal, Transition};
use super::quality::Assessment;
use crate::types::{NoAnswerReason, QualityVerdict, RouteDecision, Source};

/// Route → Retrieve | Search | Done(no answer)
pub(crate) fn after_route(decision: &RouteDecision) -> Transition {
    if !decision.needs_retrieval() {
        return Transition::Done(Terminal::NoAnswer(NoAnswerReason::NotRetrievalNeeded));
    }
    match decision.source() {
        Source::VectorStore => Transition::Goto(Node::Retrieve),
        Source::WebSearch => Transition::Goto(Node::Search),
        Source::None => Transition::Done(Terminal::NoAnswer(NoAnswerReason::NotRetrievalNeeded)),
    }
}

/// Retrieve | Search → Grade
pub(crate) fn after_fetch() -> Transition {
    Transition::Goto(Node::Grade)
}

/// Grade → Generate when anything survived grading, else Rewrite
pub(crate) fn after_grade(relevant: usize) -> Transition {
    if relevant > 0 {
        Transition::Goto(Node::Generate)
    } else {
        Transition::Goto(Node::Rewrite)
    }
}

/// Generate → QualityCheck
pub(crate) fn after_generate() -> Transition {
    Transition::Goto(Node::QualityCheck)
}

/// Entering Rewrite: `None` means the loop guard allows a rewrite, after
/// which the run re-enters Route.
pub(crate) fn rewrite_limit(loop_count: u32, guard: &LoopGuard) -> Option<Transition> {
    if guard.may_rewrite(loop_count) {
        None
    } else {
        Some(Transition::Done(Terminal::NoAnswer(
            NoAnswerReason::MaxLoopsExceeded,
        )))
    }
}

/// Rewrite → Route
pub(crate) fn after_rewrite() -> Transition {
    Transition::Goto(Node::Route)
}

/// QualityCheck → Done(answer) | Generate | Rewrite.
///
/// A hallucinated generation is regenerated while the regenerate budget
/// lasts, then handed to Rewrite like an incomplete one.
pub(crate) fn after_quality(
    assessment: Assessment,
    regenerate_count: u32,
    guard: &LoopGuard,
) -> Transition {
    match assessment {
        Assessment::Verified(verified) => Transition::Done(Terminal::Answered(verified)),
        Assessment::Rejected(QualityVerdict::Hallucinated) => {
            if guard.may_regenerate(regenerate_count) {
                Transition::Goto(Node::Generate)
            } else {
                tracing::warn!(
                    regenerate_count,
                    "Regenerate budget exhausted, rewriting the question"
                );
                Transition::Goto(Node::Rewrite)
            }
        }
        Assessment::Rejected(_) => Transition::Goto(Node::Rewrite),
    }
}
