//! Quality gate between Generate and Done

use crate::types::{Completeness, Grounding, QualityVerdict};

/// A generation that passed both quality checks.
///
/// The constructor is private to this module and only reachable through
/// [`QualityGate::assess`], which is the only way to build
/// [`crate::types::Outcome::Answered`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedGeneration(String);

impl VerifiedGeneration {
    pub(crate) fn into_inner(self) -> String {
        self.0
    }
}

/// Result of assessing one generation
#[derive(Debug)]
pub(crate) enum Assessment {
    Verified(VerifiedGeneration),
    Rejected(QualityVerdict),
}

impl Assessment {
    pub(crate) fn verdict(&self) -> QualityVerdict {
        match self {
            Assessment::Verified(_) => QualityVerdict::Pass,
            Assessment::Rejected(verdict) => *verdict,
        }
    }
}

pub(crate) struct QualityGate;

impl QualityGate {
    /// Combine the checker verdicts for `generation`.
    ///
    /// `completeness` is `None` when it was not evaluated, which only happens
    /// after a hallucination verdict or a checker timeout.
    pub(crate) fn assess(
        generation: &str,
        grounding: Grounding,
        completeness: Option<Completeness>,
    ) -> Assessment {
        match QualityVerdict::combine(grounding, completeness) {
            QualityVerdict::Pass => Assessment::Verified(VerifiedGeneration(generation.to_string())),
            rejected => Assessment::Rejected(rejected),
        }
    }

    /// A missing generation (the generator timed out) is unsupported by definition
    pub(crate) fn missing_generation() -> Assessment {
        Assessment::Rejected(QualityVerdict::Hallucinated)
    }
}
