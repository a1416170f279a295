//! Loop guards and the per-call timeout/cancellation wrapper

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::node::Node;
use crate::config::GraphConfig;
use crate::error::{Error, Result};

/// The two independent loop bounds.
///
/// `max_loops` bounds Rewrite cycles, `max_regenerate_retries` bounds
/// Generate/QualityCheck cycles. Neither counter is ever used for the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopGuard {
    max_loops: u32,
    max_regenerate_retries: u32,
}

impl LoopGuard {
    pub fn new(max_loops: u32, max_regenerate_retries: u32) -> Self {
        Self {
            max_loops,
            max_regenerate_retries,
        }
    }

    pub fn from_config(config: &GraphConfig) -> Self {
        Self::new(config.max_loops, config.max_regenerate_retries)
    }

    /// Whether another rewrite is allowed at `loop_count`
    pub fn may_rewrite(&self, loop_count: u32) -> bool {
        loop_count < self.max_loops
    }

    /// Whether another regeneration is allowed at `regenerate_count`
    pub fn may_regenerate(&self, regenerate_count: u32) -> bool {
        regenerate_count < self.max_regenerate_retries
    }

    pub fn max_loops(&self) -> u32 {
        self.max_loops
    }

    pub fn max_regenerate_retries(&self) -> u32 {
        self.max_regenerate_retries
    }
}

/// Result of a guarded collaborator call
#[derive(Debug)]
pub(crate) enum Call<T> {
    Done(T),
    TimedOut,
}

impl<T> Call<T> {
    /// Substitute the node's negative value for a timeout
    pub(crate) fn or_negative(self, negative: T) -> (T, bool) {
        match self {
            Call::Done(value) => (value, false),
            Call::TimedOut => (negative, true),
        }
    }
}

/// Why a run stopped before reaching a terminal node
#[derive(Debug)]
pub(crate) enum Halt {
    Cancelled,
    Failed(Error),
}

/// Wraps every external call with the per-call budget and the run's
/// cancellation token
#[derive(Debug, Clone)]
pub(crate) struct CallGuard {
    timeout: Duration,
    cancel: CancellationToken,
}

impl CallGuard {
    pub(crate) fn new(timeout: Duration, cancel: CancellationToken) -> Self {
        Self { timeout, cancel }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Run `fut` under the budget. Cancellation drops the in-flight future.
    pub(crate) async fn call<T, F>(&self, node: Node, fut: F) -> std::result::Result<Call<T>, Halt>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::info!(%node, "Run cancelled during external call");
                Err(Halt::Cancelled)
            }
            res = tokio::time::timeout(self.timeout, fut) => match res {
                Ok(Ok(value)) => Ok(Call::Done(value)),
                Ok(Err(err)) => Err(Halt::Failed(err)),
                Err(_) => {
                    tracing::warn!(%node, timeout = ?self.timeout, "External call timed out");
                    Ok(Call::TimedOut)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_guard_bounds_are_independent() {
        let guard = LoopGuard::new(3, 1);
        assert!(guard.may_rewrite(2));
        assert!(!guard.may_rewrite(3));
        assert!(guard.may_regenerate(0));
        assert!(!guard.may_regenerate(1));
    }

    #[test]
    fn test_zero_regenerate_retries_never_regenerates() {
        let guard = LoopGuard::new(3, 0);
        assert!(!guard.may_regenerate(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_times_out() {
        let guard = CallGuard::new(Duration::from_secs(1), CancellationToken::new());
        let result = guard
            .call(Node::Retrieve, async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, Error>(1)
            })
            .await;
        assert!(matches!(result, Ok(Call::TimedOut)));
    }

    #[tokio::test]
    async fn test_call_propagates_errors() {
        let guard = CallGuard::new(Duration::from_secs(1), CancellationToken::new());
        let result = guard
            .call(Node::Route, async {
                Err::<u8, _>(Error::contract(Node::Route, "bad datasource"))
            })
            .await;
        assert!(matches!(
            result,
            Err(Halt::Failed(Error::UpstreamContractViolation { node: Node::Route, .. }))
        ));
    }

    #[tokio::test]
    async fn test_cancelled_token_abandons_call() {
        let token = CancellationToken::new();
        token.cancel();
        let guard = CallGuard::new(Duration::from_secs(60), token);
        let result = guard
            .call(Node::Generate, std::future::pending::<Result<String>>())
            .await;
        assert!(matches!(result, Err(Halt::Cancelled)));
        assert!(guard.is_cancelled());
    }

    #[test]
    fn test_or_negative() {
        assert_eq!(Call::Done(vec![1]).or_negative(vec![]), (vec![1], false));
        assert_eq!(Call::TimedOut.or_negative(Vec::<u8>::new()), (vec![], true));
    }
}
