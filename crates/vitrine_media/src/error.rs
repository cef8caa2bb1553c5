//! Media probing errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    /// Transport-level failure or non-success status.
    #[error("network error: {0}")]
    Network(String),

    /// The payload could not be decoded as an image.
    #[error(transparent)]
    Decode(#[from] image::ImageError),
}
