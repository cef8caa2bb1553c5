//! Vitrine section rendering client
//!
//! A *section* is a server-rendered fragment of storefront markup,
//! addressable by id and re-renderable for any URL. This crate provides the
//! [`SectionRenderer`] seam the components consume, the HTTP implementation,
//! and an LRU caching wrapper honoring the renderer's `use_cache` flag.

pub mod error;
pub mod renderer;

pub use error::SectionError;
pub use renderer::{CachedSectionRenderer, HttpSectionRenderer, SectionRenderer};
