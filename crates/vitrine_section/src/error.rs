//! Section client errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SectionError {
    /// Transport-level failure (DNS, connect, body read).
    #[error("network error: {0}")]
    Network(String),

    /// The storefront answered with a non-success status.
    #[error("HTTP error: {0}")]
    Status(u16),
}
