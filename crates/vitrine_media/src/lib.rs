//! Vitrine media probing
//!
//! Adaptive aspect-ratio normalization needs an image's natural dimensions,
//! which may not be known yet when a card enters the grid. [`ImageProbe`]
//! fetches dimensions; [`ImageStore`] tracks per-URL load state and exposes
//! a one-shot load notification so a deferred computation can run once the
//! image arrives.

pub mod error;
pub mod probe;
pub mod store;

pub use error::MediaError;
pub use probe::{HttpImageProbe, ImageProbe};
pub use store::{ImageStore, LoadState};
