//! Reactive state handle
//!
//! A minimal signal: a shared value plus a version counter. Readers that
//! remember the last version they saw can cheaply detect changes without
//! subscribing to anything.
//!
//! ```rust
//! use vitrine_core::State;
//!
//! let page: State<u32> = State::new(1);
//! let seen = page.version();
//!
//! page.set(2);
//! assert!(page.version() > seen);
//! assert_eq!(page.get(), 2);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// A cheap-to-clone handle to a piece of shared reactive state.
///
/// All clones observe the same value. Every mutation bumps the version
/// counter, which is the change-detection primitive components poll.
#[derive(Debug, Default)]
pub struct State<T> {
    inner: Arc<StateInner<T>>,
}

#[derive(Debug, Default)]
struct StateInner<T> {
    value: RwLock<T>,
    version: AtomicU64,
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone> State<T> {
    /// Create new state holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(StateInner {
                value: RwLock::new(value),
                version: AtomicU64::new(0),
            }),
        }
    }

    /// Read the current value.
    pub fn get(&self) -> T {
        self.inner.value.read().unwrap().clone()
    }

    /// Replace the value and bump the version.
    pub fn set(&self, value: T) {
        *self.inner.value.write().unwrap() = value;
        self.inner.version.fetch_add(1, Ordering::Release);
    }

    /// Mutate the value in place and bump the version.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        f(&mut self.inner.value.write().unwrap());
        self.inner.version.fetch_add(1, Ordering::Release);
    }

    /// Current version counter. Incremented on every `set`/`update`.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }
}
