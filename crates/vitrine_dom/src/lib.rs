//! Vitrine document model
//!
//! Server-rendered storefront markup, parsed into typed handles:
//!
//! - [`fragment`] - extracting product cards from a cached section fragment
//! - [`refs`] - one-shot resolution of a component's required references
//! - [`grid`] - the live product grid and its vertical geometry
//! - [`viewport`] - scroll viewport and sentinel intersection sensing
//! - [`history`] - session history and page URL derivation

pub mod error;
pub mod fragment;
pub mod grid;
pub mod history;
pub mod refs;
pub mod viewport;

pub use error::DomError;
pub use fragment::{parse_grid_fragment, CardSource, GallerySource};
pub use grid::{Card, CardId, Gallery, ProductGrid};
pub use history::{page_url, History, SessionHistory};
pub use refs::{resolve_document, ResolvedDocument};
pub use viewport::{
    IntersectionEntry, IntersectionObserver, SentinelKind, SentinelPositions, Viewport,
};
