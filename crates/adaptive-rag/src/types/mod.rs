//! Core types for the decision graph

pub mod document;
pub mod outcome;
pub mod state;
pub mod trace;
pub mod verdict;

pub use document::Document;
pub use outcome::{Answer, NoAnswer, NoAnswerReason, Outcome};
pub use state::QueryState;
pub use trace::{Event, EventDetail, Trace};
pub use verdict::{Completeness, Grounding, QualityVerdict, Relevance, RouteDecision, Source};
