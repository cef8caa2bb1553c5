//! Component errors

use thiserror::Error;
use vitrine_dom::DomError;

/// Configuration errors surfaced when a component binds to its document.
///
/// Everything here is fail-fast: the markup contract was violated and the
/// component refuses to mount. Runtime degradation (range exhaustion,
/// fetch failures, malformed fragments) is deliberately *not* an error -
/// infinite scroll simply stops advancing.
#[derive(Debug, Error)]
pub enum ComponentError {
    /// The host element lacks the `data-section-id` attribute.
    #[error("paginated list requires a `data-section-id` attribute")]
    MissingSectionId,

    /// A required reference or attribute is missing or unparseable.
    #[error(transparent)]
    Dom(#[from] DomError),
}
