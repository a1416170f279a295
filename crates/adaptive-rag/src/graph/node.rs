//! Graph nodes and transitions

use serde::{Deserialize, Serialize};
use std::fmt;

use super::quality::VerifiedGeneration;
use crate::types::NoAnswerReason;

/// Non-terminal nodes of the decision graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Route,
    Retrieve,
    Search,
    Grade,
    Generate,
    Rewrite,
    QualityCheck,
}

impl Node {
    pub const ALL: [Node; 7] = [
        Node::Route,
        Node::Retrieve,
        Node::Search,
        Node::Grade,
        Node::Generate,
        Node::Rewrite,
        Node::QualityCheck,
    ];

    /// Entry node of every run
    pub const INITIAL: Node = Node::Route;

    pub fn name(self) -> &'static str {
        match self {
            Node::Route => "route",
            Node::Retrieve => "retrieve",
            Node::Search => "search",
            Node::Grade => "grade",
            Node::Generate => "generate",
            Node::Rewrite => "rewrite",
            Node::QualityCheck => "quality_check",
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a run reaches `Done`
#[derive(Debug)]
pub(crate) enum Terminal {
    Answered(VerifiedGeneration),
    NoAnswer(NoAnswerReason),
}

/// Edge taken after a node executes
#[derive(Debug)]
pub(crate) enum Transition {
    Goto(Node),
    Done(Terminal),
}

impl Transition {
    pub(crate) fn target(&self) -> Option<Node> {
        match self {
            Transition::Goto(node) => Some(*node),
            Transition::Done(_) => None,
        }
    }
}
