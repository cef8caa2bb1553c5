//! Vitrine core primitives
//!
//! The small runtime substrate shared by every Vitrine component:
//!
//! - [`State<T>`] - cheap-to-clone reactive state handle with version-based
//!   change detection
//! - [`FrameScheduler`] - frame and idle work queues (the animation-frame /
//!   idle-callback pair components defer DOM-dependent work to)
//! - [`TransitionGate`] - mutual-exclusion gate for view transitions; content
//!   mutation waits for an active transition to finish
//! - [`Debouncer`] / [`Throttle`] - event-rate helpers

pub mod scheduler;
pub mod state;
pub mod transition;
pub mod util;

pub use scheduler::{FrameScheduler, SchedulerHandle};
pub use state::State;
pub use transition::{TransitionGate, TransitionGuard};
pub use util::{Debouncer, Throttle};
