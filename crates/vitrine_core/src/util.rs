//! Event-rate helpers
//!
//! `Debouncer` collapses a burst of calls into one trailing invocation after
//! a quiet period; `Throttle` lets the leading call through and swallows the
//! rest of the window. Both run on tokio time, so paused-clock tests drive
//! them deterministically.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

/// Trailing-edge debouncer.
///
/// Each `call()` restarts the quiet-period timer; the wrapped closure runs
/// once the calls stop for `delay`. Dropping the debouncer cancels any
/// pending invocation.
pub struct Debouncer {
    tx: mpsc::UnboundedSender<()>,
}

impl Debouncer {
    pub fn new<F>(delay: Duration, mut f: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                loop {
                    match tokio::time::timeout(delay, rx.recv()).await {
                        // Another call inside the window restarts the timer.
                        Ok(Some(())) => continue,
                        // Handle dropped mid-window: cancel.
                        Ok(None) => return,
                        // Quiet period elapsed.
                        Err(_) => {
                            f();
                            break;
                        }
                    }
                }
            }
        });
        Self { tx }
    }

    /// Register a call. The wrapped closure fires `delay` after the last one.
    pub fn call(&self) {
        let _ = self.tx.send(());
    }
}

/// Leading-edge throttle.
///
/// `poll()` returns `true` at most once per window.
pub struct Throttle {
    window: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Returns `true` if the caller may proceed, `false` while throttled.
    pub fn poll(&mut self) -> bool {
        let now = Instant::now();
        match self.last {
            Some(last) if now.duration_since(last) < self.window => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_debounce_collapses_burst() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let debouncer = Debouncer::new(Duration::from_millis(100), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        for _ in 0..5 {
            debouncer.call();
            tokio::time::advance(Duration::from_millis(20)).await;
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_millis(150)).await;
        tokio::task::yield_now().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_fires_per_quiet_period() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let debouncer = Debouncer::new(Duration::from_millis(50), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        debouncer.call();
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_millis(80)).await;
        tokio::task::yield_now().await;

        debouncer.call();
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_millis(80)).await;
        tokio::task::yield_now().await;

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_leading_edge() {
        let mut throttle = Throttle::new(Duration::from_millis(100));

        assert!(throttle.poll());
        assert!(!throttle.poll());

        tokio::time::advance(Duration::from_millis(50)).await;
        assert!(!throttle.poll());

        tokio::time::advance(Duration::from_millis(60)).await;
        assert!(throttle.poll());
    }
}
