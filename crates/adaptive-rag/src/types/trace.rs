//! Append-only execution trace

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::verdict::{QualityVerdict, RouteDecision};
use crate::graph::Node;

/// What a node produced, recorded once per node execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventDetail {
    Routed {
        decision: RouteDecision,
        timed_out: bool,
    },
    Retrieved {
        count: usize,
        timed_out: bool,
    },
    Searched {
        count: usize,
        timed_out: bool,
    },
    Graded {
        relevant: usize,
        total: usize,
        timed_out: usize,
    },
    Generated {
        chars: usize,
        attempt: u32,
        timed_out: bool,
    },
    QualityChecked {
        verdict: QualityVerdict,
        timed_out: bool,
    },
    Rewritten {
        question: String,
        loop_count: u32,
        timed_out: bool,
    },
    LoopLimitReached {
        loop_count: u32,
    },
    Failed {
        detail: String,
    },
}

impl fmt::Display for EventDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timeout = |t: bool| if t { " (timed out)" } else { "" };
        match self {
            EventDetail::Routed { decision, timed_out } => {
                write!(f, "{}{}", decision, timeout(*timed_out))
            }
            EventDetail::Retrieved { count, timed_out } => {
                write!(f, "{} documents{}", count, timeout(*timed_out))
            }
            EventDetail::Searched { count, timed_out } => {
                write!(f, "{} web results{}", count, timeout(*timed_out))
            }
            EventDetail::Graded {
                relevant,
                total,
                timed_out,
            } => {
                write!(f, "{}/{} relevant", relevant, total)?;
                if *timed_out > 0 {
                    write!(f, " ({} timed out)", timed_out)?;
                }
                Ok(())
            }
            EventDetail::Generated {
                chars,
                attempt,
                timed_out,
            } => write!(
                f,
                "attempt {}: {} chars{}",
                attempt,
                chars,
                timeout(*timed_out)
            ),
            EventDetail::QualityChecked { verdict, timed_out } => {
                write!(f, "{}{}", verdict, timeout(*timed_out))
            }
            EventDetail::Rewritten {
                question,
                loop_count,
                timed_out,
            } => write!(
                f,
                "loop {}: \"{}\"{}",
                loop_count,
                question,
                timeout(*timed_out)
            ),
            EventDetail::LoopLimitReached { loop_count } => {
                write!(f, "loop limit reached after {} rewrites", loop_count)
            }
            EventDetail::Failed { detail } => write!(f, "failed: {}", detail),
        }
    }
}

/// One node execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Zero-based position in the run
    pub step: usize,
    pub node: Node,
    pub detail: EventDetail,
    /// Question in effect once the node finished
    pub question: String,
    pub elapsed_ms: u64,
    /// When the node finished
    pub at: DateTime<Utc>,
}

/// Ordered log of node executions in one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trace {
    events: Vec<Event>,
}

impl Trace {
    pub(crate) fn push(
        &mut self,
        node: Node,
        detail: EventDetail,
        question: &str,
        elapsed_ms: u64,
    ) -> &Event {
        let step = self.events.len();
        self.events.push(Event {
            step,
            node,
            detail,
            question: question.to_string(),
            elapsed_ms,
            at: Utc::now(),
        });
        &self.events[step]
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    /// Node sequence, in execution order
    pub fn nodes(&self) -> Vec<Node> {
        self.events.iter().map(|e| e.node).collect()
    }

    /// Number of times `node` executed
    pub fn count(&self, node: Node) -> usize {
        self.events.iter().filter(|e| e.node == node).count()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(
                f,
                "{:>2}. {:<13} {} [{}ms]",
                event.step + 1,
                event.node.to_string(),
                event.detail,
                event.elapsed_ms
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_assigns_sequential_steps() {
        let mut trace = Trace::default();
        trace.push(
            Node::Route,
            EventDetail::Routed {
                decision: RouteDecision::vector_store(),
                timed_out: false,
            },
            "q",
            3,
        );
        trace.push(
            Node::Retrieve,
            EventDetail::Retrieved {
                count: 4,
                timed_out: false,
            },
            "q",
            7,
        );

        assert_eq!(trace.len(), 2);
        assert_eq!(trace.nodes(), vec![Node::Route, Node::Retrieve]);
        assert_eq!(trace.events()[1].step, 1);
        assert_eq!(trace.count(Node::Retrieve), 1);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let mut trace = Trace::default();
        trace.push(
            Node::Rewrite,
            EventDetail::LoopLimitReached { loop_count: 3 },
            "q",
            0,
        );

        let value = serde_json::to_value(&trace).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["node"], "rewrite");
        assert_eq!(value[0]["detail"]["kind"], "loop_limit_reached");
    }
}
