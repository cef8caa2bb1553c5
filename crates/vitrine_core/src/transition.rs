//! View-transition gate
//!
//! A view transition snapshots the document; mutating content mid-snapshot
//! tears the animation. The gate is the mutual-exclusion primitive: whoever
//! starts a transition holds a [`TransitionGuard`], and content mutators call
//! [`TransitionGate::wait_idle`] before touching anything.
//!
//! ```rust
//! # use vitrine_core::TransitionGate;
//! # async fn demo() {
//! let gate = TransitionGate::new();
//!
//! let guard = gate.begin(); // transition running
//! assert!(gate.is_active());
//!
//! drop(guard); // transition finished
//! gate.wait_idle().await; // returns immediately
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::watch;

/// Shared gate tracking whether a view transition is in progress.
///
/// Clones share the same gate. Multiple overlapping transitions are counted;
/// the gate is idle only when every guard has dropped.
#[derive(Clone)]
pub struct TransitionGate {
    active: Arc<watch::Sender<usize>>,
}

impl TransitionGate {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self {
            active: Arc::new(tx),
        }
    }

    /// Mark a transition as started. The transition ends when the returned
    /// guard drops.
    pub fn begin(&self) -> TransitionGuard {
        self.active.send_modify(|n| *n += 1);
        tracing::debug!(active = *self.active.borrow(), "view transition started");
        TransitionGuard {
            active: Arc::clone(&self.active),
        }
    }

    /// Whether any transition is currently running.
    pub fn is_active(&self) -> bool {
        *self.active.borrow() > 0
    }

    /// Suspend until no transition is running. Returns immediately when idle.
    pub async fn wait_idle(&self) {
        let mut rx = self.active.subscribe();
        // Only fails if the sender drops, and we hold it.
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}

impl Default for TransitionGate {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard for a running transition. Dropping it releases the gate.
pub struct TransitionGuard {
    active: Arc<watch::Sender<usize>>,
}

impl Drop for TransitionGuard {
    fn drop(&mut self) {
        self.active.send_modify(|n| *n = n.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_idle_gate_passes_immediately() {
        let gate = TransitionGate::new();
        assert!(!gate.is_active());
        gate.wait_idle().await;
    }

    #[tokio::test]
    async fn test_waiter_released_on_guard_drop() {
        let gate = TransitionGate::new();
        let guard = gate.begin();
        assert!(gate.is_active());

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move {
                gate.wait_idle().await;
            })
        };

        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
        assert!(!gate.is_active());
    }

    #[tokio::test]
    async fn test_overlapping_transitions() {
        let gate = TransitionGate::new();
        let a = gate.begin();
        let b = gate.begin();

        drop(a);
        assert!(gate.is_active());

        drop(b);
        assert!(!gate.is_active());
        gate.wait_idle().await;
    }
}
