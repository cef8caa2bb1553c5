//! Frame and idle scheduling
//!
//! Components never touch layout-dependent state directly from event
//! handlers; they queue work on a [`FrameScheduler`] instead. The scheduler
//! keeps two queues:
//!
//! - the **frame queue**, drained first on every [`FrameScheduler::run_frame`]
//!   call (the animation-frame analog - layout has settled by the time these
//!   jobs run)
//! - the **idle queue**, drained after all frame work (the idle-callback
//!   analog - background work that must not compete with rendering, such as
//!   follow-up page prefetches)
//!
//! Jobs queued while a frame is being drained land in the *next* frame.
//! Components hold a weak [`SchedulerHandle`]; queueing on a dropped
//! scheduler is a silent no-op.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Weak};

type Job = Box<dyn FnOnce() + Send>;

struct SchedulerInner {
    frame: VecDeque<Job>,
    idle: VecDeque<Job>,
}

/// Owner of the frame/idle queues. Held by the host loop; components get a
/// [`SchedulerHandle`] via [`FrameScheduler::handle`].
pub struct FrameScheduler {
    inner: Arc<Mutex<SchedulerInner>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SchedulerInner {
                frame: VecDeque::new(),
                idle: VecDeque::new(),
            })),
        }
    }

    /// Get a weak handle for passing to components.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Drain the frame queue, then the idle queue.
    ///
    /// Only jobs queued before this call run; jobs queued by running jobs
    /// are deferred to the next frame. Returns the number of jobs executed.
    pub fn run_frame(&self) -> usize {
        let mut executed = 0;

        // Snapshot lengths so re-queued work waits for the next frame.
        let frame_count = self.inner.lock().unwrap().frame.len();
        for _ in 0..frame_count {
            let job = self.inner.lock().unwrap().frame.pop_front();
            match job {
                Some(job) => {
                    job();
                    executed += 1;
                }
                None => break,
            }
        }

        let idle_count = self.inner.lock().unwrap().idle.len();
        for _ in 0..idle_count {
            let job = self.inner.lock().unwrap().idle.pop_front();
            match job {
                Some(job) => {
                    job();
                    executed += 1;
                }
                None => break,
            }
        }

        executed
    }

    /// Whether any work is queued.
    pub fn has_pending(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        !inner.frame.is_empty() || !inner.idle.is_empty()
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// A weak handle to the scheduler.
///
/// Won't keep the scheduler alive; queueing after the scheduler is dropped
/// does nothing.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<Mutex<SchedulerInner>>,
}

impl SchedulerHandle {
    /// Queue a job for the next frame.
    pub fn request_frame<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().unwrap().frame.push_back(Box::new(job));
        }
    }

    /// Queue a job at idle priority (runs after all frame work).
    pub fn request_idle<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().unwrap().idle.push_back(Box::new(job));
        }
    }

    /// Check if the scheduler is still alive.
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_frame_before_idle() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let order = Arc::new(Mutex::new(Vec::new()));

        let o = Arc::clone(&order);
        handle.request_idle(move || o.lock().unwrap().push("idle"));
        let o = Arc::clone(&order);
        handle.request_frame(move || o.lock().unwrap().push("frame"));

        assert_eq!(scheduler.run_frame(), 2);
        assert_eq!(*order.lock().unwrap(), vec!["frame", "idle"]);
    }

    #[test]
    fn test_requeued_job_waits_for_next_frame() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let count = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&count);
        let h = handle.clone();
        handle.request_frame(move || {
            c.fetch_add(1, Ordering::SeqCst);
            let c = Arc::clone(&c);
            h.request_frame(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        });

        assert_eq!(scheduler.run_frame(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(scheduler.has_pending());

        assert_eq!(scheduler.run_frame(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(!scheduler.has_pending());
    }

    #[test]
    fn test_dead_scheduler_noop() {
        let handle = {
            let scheduler = FrameScheduler::new();
            scheduler.handle()
        };

        assert!(!handle.is_alive());
        handle.request_frame(|| panic!("must not run"));
    }
}
