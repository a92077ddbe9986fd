//! Ledger of outstanding asynchronous additions.
//!
//! Every asynchronous operation on a set registers here *before* it starts
//! resolving, so a snapshot of the ledger always covers work scheduled up to
//! that instant. Settling removes the entry and broadcasts the outcome to
//! however many waiters are interested. Failures stick: once any addition has
//! failed, [`PendingOps::converged`] keeps reporting the earliest failure.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::error::SetError;

type Outcome = Result<(), SetError>;

#[derive(Default)]
struct Ledger {
    next_id: u64,
    ops: FxHashMap<u64, PendingOp>,
    first_failure: Option<(u64, SetError)>,
}

/// Shared handle to the ledger. Cloning shares state.
#[derive(Clone, Default)]
pub(crate) struct PendingOps {
    ledger: Arc<Mutex<Ledger>>,
}

impl PendingOps {
    /// Register a new operation. The returned guard must be settled exactly
    /// once; dropping it unsettled counts as a failure.
    pub(crate) fn register(&self, name: &'static str) -> OpGuard {
        let (tx, rx) = watch::channel(None::<Outcome>);
        let mut ledger = self.ledger.lock();
        let id = ledger.next_id;
        ledger.next_id += 1;
        ledger.ops.insert(id, PendingOp { rx });
        trace!(op = name, id, outstanding = ledger.ops.len(), "registered");
        OpGuard {
            ops: self.clone(),
            id,
            name,
            tx: Some(tx),
        }
    }

    /// The operations outstanding right now. A combine waits on exactly this
    /// wave, taken before it registers itself.
    pub(crate) fn snapshot(&self) -> Vec<PendingOp> {
        self.ledger.lock().ops.values().cloned().collect()
    }

    pub(crate) fn is_idle(&self) -> bool {
        self.ledger.lock().ops.is_empty()
    }

    pub(crate) fn first_failure(&self) -> Option<SetError> {
        self.ledger
            .lock()
            .first_failure
            .as_ref()
            .map(|(_, err)| err.clone())
    }

    /// Wait until no additions are outstanding, including any scheduled while
    /// waiting, then report the overall outcome.
    ///
    /// The wait aborts as soon as any addition has failed; siblings still in
    /// flight settle on their own. New registrations trigger another round.
    /// The earliest recorded failure sticks: it is the result now and on
    /// every later call.
    pub(crate) async fn converged(&self) -> Outcome {
        loop {
            if let Some(err) = self.first_failure() {
                return Err(err);
            }
            let wave = self.snapshot();
            if wave.is_empty() {
                return Ok(());
            }
            // settlements arrive in completion order, so a failure is seen
            // without waiting out slower siblings
            let mut settling: FuturesUnordered<_> =
                wave.into_iter().map(PendingOp::settled).collect();
            while settling.next().await.is_some() {
                if let Some(err) = self.first_failure() {
                    return Err(err);
                }
            }
        }
    }

    fn settle(&self, id: u64, outcome: &Outcome) {
        let mut ledger = self.ledger.lock();
        ledger.ops.remove(&id);
        if let Err(err) = outcome {
            let supersedes = ledger
                .first_failure
                .as_ref()
                .is_none_or(|(stored, _)| id < *stored);
            if supersedes {
                ledger.first_failure = Some((id, err.clone()));
            }
        }
    }
}

/// One outstanding operation, as seen by waiters.
#[derive(Clone)]
pub(crate) struct PendingOp {
    rx: watch::Receiver<Option<Outcome>>,
}

impl PendingOp {
    /// Wait for this operation to settle and return its outcome.
    pub(crate) async fn settled(mut self) -> Outcome {
        let settled = self
            .rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| SetError::Internal("addition vanished without settling".into()))?;
        match &*settled {
            Some(outcome) => outcome.clone(),
            None => Ok(()),
        }
    }
}

/// Settlement handle held by the task performing an operation.
pub(crate) struct OpGuard {
    ops: PendingOps,
    id: u64,
    name: &'static str,
    tx: Option<watch::Sender<Option<Outcome>>>,
}

impl OpGuard {
    pub(crate) fn settle(mut self, outcome: Outcome) {
        self.finish(outcome);
    }

    fn finish(&mut self, outcome: Outcome) {
        let Some(tx) = self.tx.take() else {
            return;
        };
        self.ops.settle(self.id, &outcome);
        if outcome.is_err() {
            debug!(op = self.name, id = self.id, ?outcome, "addition failed");
        } else {
            trace!(op = self.name, id = self.id, "settled");
        }
        let _ = tx.send(Some(outcome));
    }
}

impl Drop for OpGuard {
    fn drop(&mut self) {
        if self.tx.is_some() {
            self.finish(Err(SetError::Internal(format!(
                "{} dropped before settling",
                self.name
            ))));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_converged_on_idle_ledger() {
        let ops = PendingOps::default();
        assert!(ops.is_idle());
        ops.converged().await.unwrap();
    }

    #[tokio::test]
    async fn test_settlement_empties_the_ledger() {
        let ops = PendingOps::default();
        let a = ops.register("a");
        let b = ops.register("b");
        assert_eq!(ops.snapshot().len(), 2);
        a.settle(Ok(()));
        assert_eq!(ops.snapshot().len(), 1);
        b.settle(Ok(()));
        assert!(ops.is_idle());
    }

    #[tokio::test]
    async fn test_converged_waits_for_spawned_settlement() {
        let ops = PendingOps::default();
        let guard = ops.register("add");
        let handle = tokio::spawn(async move {
            guard.settle(Ok(()));
        });
        ops.converged().await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_waiters_all_see_the_outcome() {
        let ops = PendingOps::default();
        let guard = ops.register("add");
        let op = ops.snapshot().pop().unwrap();
        let first = tokio::spawn(op.clone().settled());
        let second = tokio::spawn(op.settled());
        guard.settle(Ok(()));
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_failures_are_sticky() {
        let ops = PendingOps::default();
        ops.register("bad").settle(Err(SetError::Internal("boom".into())));
        assert!(ops.converged().await.is_err());
        // still failed on the next call
        assert!(ops.converged().await.is_err());
    }

    #[tokio::test]
    async fn test_earliest_failure_wins() {
        let ops = PendingOps::default();
        let first = ops.register("first");
        let second = ops.register("second");
        second.settle(Err(SetError::Internal("second".into())));
        first.settle(Err(SetError::Internal("first".into())));
        let err = ops.converged().await.unwrap_err();
        assert_eq!(err, SetError::Internal("first".into()));
    }

    #[tokio::test]
    async fn test_failure_reported_while_siblings_still_pending() {
        let ops = PendingOps::default();
        let slow = ops.register("slow");
        ops.register("fast").settle(Err(SetError::Internal("boom".into())));
        let err = ops.converged().await.unwrap_err();
        assert_eq!(err, SetError::Internal("boom".into()));
        // the sibling was not waited out and settles on its own
        assert!(!ops.is_idle());
        slow.settle(Ok(()));
        let err = ops.converged().await.unwrap_err();
        assert_eq!(err, SetError::Internal("boom".into()));
    }

    #[tokio::test]
    async fn test_failure_aborts_the_drain_mid_wave() {
        let ops = PendingOps::default();
        let slow = ops.register("slow");
        let fast = ops.register("fast");
        let handle = tokio::spawn(async move {
            fast.settle(Err(SetError::Internal("boom".into())));
        });
        // the slow sibling never settles before the wait returns, so only
        // the aborting path can finish this
        let err = ops.converged().await.unwrap_err();
        assert_eq!(err, SetError::Internal("boom".into()));
        slow.settle(Ok(()));
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_dropped_guard_fails_the_operation() {
        let ops = PendingOps::default();
        drop(ops.register("doomed"));
        let err = ops.converged().await.unwrap_err();
        assert!(matches!(err, SetError::Internal(_)));
    }

    #[tokio::test]
    async fn test_registrations_during_a_wave_extend_convergence() {
        let ops = PendingOps::default();
        let first = ops.register("first");
        let chained = ops.clone();
        let handle = tokio::spawn(async move {
            let second = chained.register("second");
            first.settle(Ok(()));
            second.settle(Ok(()));
        });
        ops.converged().await.unwrap();
        assert!(ops.is_idle());
        handle.await.unwrap();
    }
}
