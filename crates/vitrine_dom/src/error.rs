//! Document model errors

use thiserror::Error;

/// Errors raised while parsing storefront markup.
///
/// `MissingRef` and `MissingAttr` are configuration errors: the markup the
/// component was mounted on does not satisfy its contract. `MissingMarker`
/// and `InvalidAttr` also occur on cached fragments, where the caller treats
/// them as a silent per-page abort.
#[derive(Debug, Error)]
pub enum DomError {
    /// A structural marker (e.g. the product grid) is absent from a fragment.
    #[error("fragment is missing the `{0}` marker")]
    MissingMarker(&'static str),

    /// A required component reference is absent from the document.
    #[error("missing required ref `{0}`")]
    MissingRef(&'static str),

    /// An element lacks a required attribute.
    #[error("element is missing the `{0}` attribute")]
    MissingAttr(&'static str),

    /// An attribute is present but unparseable.
    #[error("attribute `{attr}` has invalid value `{value}`")]
    InvalidAttr { attr: &'static str, value: String },
}
