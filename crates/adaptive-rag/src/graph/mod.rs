//! Decision graph: nodes, conditional edges, guards and the engine that
//! drives a question from Route to Done

mod describe;
mod edges;
mod engine;
mod guard;
mod node;
mod quality;

pub use describe::{describe, mermaid, EdgeSpec, EDGES};
pub use engine::{Collaborators, Orchestrator};
pub use guard::LoopGuard;
pub use node::Node;
pub use quality::VerifiedGeneration;
