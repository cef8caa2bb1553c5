//! Gallery aspect-ratio normalization
//!
//! Product images reserve layout space before they load by getting an
//! explicit aspect ratio. The mode is chosen once per component instance
//! from the first gallery's `data-image-ratio`:
//!
//! - fixed modes map to a constant (`square` → `1`, `portrait` → `0.8`,
//!   `landscape` → `1.778`)
//! - `adapt` derives each gallery's ratio from its image's natural
//!   dimensions, clamped to `[0.1, 10]` and rendered to 3 decimals
//!
//! A normalization batch runs once per splice, on the frame after layout
//! settles. Galleries are marked processed so later batches skip them; a
//! per-batch cache keyed by product id avoids recomputing identical ratios
//! for repeated products. Images still loading defer their computation to
//! the load notification.

use std::collections::HashMap;

use tokio::sync::watch;

use vitrine_dom::{CardId, ProductGrid};
use vitrine_media::{ImageStore, LoadState};

/// Ratio applied when a gallery has no image or its image failed to load.
pub const DEFAULT_RATIO: &str = "1";

/// How gallery aspect ratios are determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioMode {
    Square,
    Portrait,
    Landscape,
    Adapt,
}

impl RatioMode {
    /// Parse the `data-image-ratio` attribute. Unknown or absent values
    /// fall back to `Square`.
    pub fn from_attr(attr: Option<&str>) -> Self {
        match attr {
            Some("portrait") => RatioMode::Portrait,
            Some("landscape") => RatioMode::Landscape,
            Some("adapt") => RatioMode::Adapt,
            Some("square") | None => RatioMode::Square,
            Some(other) => {
                tracing::debug!(value = other, "unknown image ratio mode, using square");
                RatioMode::Square
            }
        }
    }

    /// The constant ratio string for fixed modes; `None` for `Adapt`.
    pub fn fixed_ratio(self) -> Option<&'static str> {
        match self {
            RatioMode::Square => Some("1"),
            RatioMode::Portrait => Some("0.8"),
            RatioMode::Landscape => Some("1.778"),
            RatioMode::Adapt => None,
        }
    }
}

/// Ratio string for an image's natural dimensions: width/height clamped to
/// `[0.1, 10]`, 3 decimal places.
pub fn adaptive_ratio(width: u32, height: u32) -> String {
    if height == 0 {
        return DEFAULT_RATIO.to_string();
    }
    let ratio = (width as f32 / height as f32).clamp(0.1, 10.0);
    format!("{ratio:.3}")
}

/// A gallery whose ratio computation waits on its image's load event.
pub struct DeferredRatio {
    pub card: CardId,
    pub src: String,
    pub signal: watch::Receiver<bool>,
}

/// Normalize every unprocessed gallery in the grid.
///
/// `cache` is the per-batch product-id → ratio map; it is scoped to one
/// call and owned by the caller. Galleries whose image is still loading are
/// marked processed and returned as [`DeferredRatio`]s for the caller to
/// resolve once their load notification fires.
pub fn normalize_batch(
    grid: &mut ProductGrid,
    mode: RatioMode,
    images: &ImageStore,
    cache: &mut HashMap<String, String>,
) -> Vec<DeferredRatio> {
    let mut deferred = Vec::new();

    for card in grid.cards_mut() {
        let product_id = card.product_id.clone();
        let Some(gallery) = card.gallery.as_mut() else {
            continue;
        };
        if gallery.processed {
            continue;
        }
        gallery.processed = true;

        if let Some(fixed) = mode.fixed_ratio() {
            gallery.ratio = Some(fixed.to_string());
            continue;
        }

        let Some(src) = gallery.image_src.clone() else {
            gallery.ratio = Some(DEFAULT_RATIO.to_string());
            continue;
        };

        if let Some(ratio) = cache.get(&product_id) {
            gallery.ratio = Some(ratio.clone());
            continue;
        }

        match images.request(&src) {
            LoadState::Ready { width, height } => {
                let ratio = adaptive_ratio(width, height);
                cache.insert(product_id, ratio.clone());
                gallery.ratio = Some(ratio);
            }
            LoadState::Loading(signal) => {
                deferred.push(DeferredRatio {
                    card: card.id,
                    src,
                    signal,
                });
            }
            LoadState::Failed => {
                gallery.ratio = Some(DEFAULT_RATIO.to_string());
            }
        }
    }

    deferred
}
