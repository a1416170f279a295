//! adaptive-rag: question answering over a typed decision graph
//!
//! A question is routed to a document store, web search, or no retrieval at
//! all. Retrieved evidence is graded, an answer is generated from the
//! relevant part, and the answer is only returned once it is both grounded
//! in that evidence and complete. Failed checks loop back to regeneration or
//! a question rewrite, bounded by independent loop guards.

pub mod config;
pub mod error;
pub mod graph;
pub mod judgment;
pub mod pipeline;
pub mod providers;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result, RunFailure};
pub use graph::{Collaborators, Node, Orchestrator};
pub use pipeline::Pipeline;
pub use types::{Document, NoAnswerReason, Outcome, QueryState, Trace};
