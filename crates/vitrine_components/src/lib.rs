//! Vitrine storefront components
//!
//! The interactive pieces of the storefront, headlined by the paginated
//! infinite-scroll product grid:
//!
//! - [`PaginatedList`] - bidirectional infinite scroll over server-rendered
//!   pages: page cache, per-direction prefetch coordination, viewport-stable
//!   prepend, history updates, and frame-deferred aspect-ratio
//!   normalization
//! - [`aspect`] - fixed and adaptive gallery aspect-ratio normalization
//! - [`money`] - storefront money formatting
//! - [`Component`] - the lifecycle seam (`connected`/`disconnected`) hosts
//!   drive

pub mod aspect;
pub mod component;
pub mod error;
pub mod money;
pub mod paginated_list;

pub use aspect::RatioMode;
pub use component::{Component, ComponentContext};
pub use error::ComponentError;
pub use money::format_money;
pub use paginated_list::{CardSummary, Direction, PageDescriptor, PaginatedList, RenderOutcome};
