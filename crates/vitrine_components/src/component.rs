//! Component lifecycle and shared context
//!
//! Hosts drive components through the two lifecycle hooks: `connected` when
//! the component enters the document, `disconnected` when it leaves.
//! Reference resolution happens earlier, at construction - by the time a
//! component exists, its required refs are validated and typed.

use std::sync::Arc;

use url::Url;

use vitrine_core::{SchedulerHandle, TransitionGate};
use vitrine_dom::History;
use vitrine_media::ImageStore;
use vitrine_section::SectionRenderer;

use crate::error::ComponentError;

/// Lifecycle hooks every Vitrine component implements.
pub trait Component {
    /// The component entered the document. Activation work (observers,
    /// initial prefetches) happens here.
    fn connected(&mut self) -> Result<(), ComponentError>;

    /// The component left the document; observers are released.
    fn disconnected(&mut self);
}

/// Everything a component needs from its host.
#[derive(Clone)]
pub struct ComponentContext {
    /// Renders section fragments for URLs.
    pub renderer: Arc<dyn SectionRenderer>,
    /// Image dimension store backing adaptive aspect ratios.
    pub images: ImageStore,
    /// Session history sink.
    pub history: Arc<dyn History>,
    /// View-transition gate; content mutation waits on it.
    pub gate: TransitionGate,
    /// Frame/idle scheduler handle.
    pub scheduler: SchedulerHandle,
    /// The page URL the component was mounted on.
    pub base_url: Url,
    /// Scroll viewport height in pixels.
    pub viewport_height: f32,
}
