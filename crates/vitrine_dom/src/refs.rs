//! Component reference resolution
//!
//! A component's required references are resolved and validated once, at
//! construction, yielding typed data instead of repeated document queries.
//! A missing reference is a configuration error surfaced immediately.
//!
//! The paginated-list host element looks like:
//!
//! ```html
//! <div data-paginated-list data-section-id="main-collection" data-money-format="${{amount}}">
//!   <span data-view-more-previous></span>
//!   <div data-product-grid data-last-page="3" data-columns="3">
//!     <article data-product-card data-page="2" data-product-id="sku-1">...</article>
//!   </div>
//!   <span data-view-more-next></span>
//! </div>
//! ```

use scraper::Html;

use crate::error::DomError;
use crate::fragment::{collect_cards, selector, CardSource};

/// Everything the paginated list binds from its host document.
#[derive(Debug)]
pub struct ResolvedDocument {
    /// `data-section-id` of the host element, when present. Whether its
    /// absence is fatal is the component's call.
    pub section_id: Option<String>,
    /// Money format template from `data-money-format`, when present.
    pub money_format: Option<String>,
    /// Upper pagination bound from the grid's `data-last-page`.
    pub last_page: u32,
    /// Grid column count from `data-columns` (defaults to 1).
    pub columns: usize,
    /// `data-image-ratio` of the first card's gallery, when present.
    pub ratio_attr: Option<String>,
    /// The initially rendered cards, in document order.
    pub cards: Vec<CardSource>,
}

/// Resolve and validate all required references in a host document.
///
/// Required: the `[data-paginated-list]` host, both sentinels, the product
/// grid with a parseable `data-last-page`, and at least one card.
pub fn resolve_document(html: &str) -> Result<ResolvedDocument, DomError> {
    let doc = Html::parse_document(html);

    let root_sel = selector("[data-paginated-list]");
    let root = doc
        .select(&root_sel)
        .next()
        .ok_or(DomError::MissingRef("paginated-list"))?;

    for (css, name) in [
        ("[data-view-more-previous]", "view-more-previous"),
        ("[data-view-more-next]", "view-more-next"),
    ] {
        let sel = selector(css);
        if root.select(&sel).next().is_none() {
            return Err(DomError::MissingRef(name));
        }
    }

    let grid_sel = selector("[data-product-grid]");
    let grid = root
        .select(&grid_sel)
        .next()
        .ok_or(DomError::MissingRef("grid"))?;

    let last_page_raw = grid
        .value()
        .attr("data-last-page")
        .ok_or(DomError::MissingAttr("data-last-page"))?;
    let last_page = last_page_raw
        .parse::<u32>()
        .map_err(|_| DomError::InvalidAttr {
            attr: "data-last-page",
            value: last_page_raw.to_string(),
        })?;

    let columns = match grid.value().attr("data-columns") {
        Some(raw) => raw.parse::<usize>().map_err(|_| DomError::InvalidAttr {
            attr: "data-columns",
            value: raw.to_string(),
        })?,
        None => 1,
    };

    let cards = collect_cards(grid)?;
    if cards.is_empty() {
        return Err(DomError::MissingRef("cards"));
    }

    let ratio_attr = cards
        .first()
        .and_then(|c| c.gallery.as_ref())
        .and_then(|g| g.ratio_attr.clone());

    Ok(ResolvedDocument {
        section_id: root.value().attr("data-section-id").map(str::to_string),
        money_format: root.value().attr("data-money-format").map(str::to_string),
        last_page,
        columns,
        ratio_attr,
        cards,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(section_id: &str, grid_attrs: &str, cards: &str) -> String {
        format!(
            r#"<html><body>
            <div data-paginated-list {section_id}>
              <span data-view-more-previous></span>
              <div data-product-grid {grid_attrs}>{cards}</div>
              <span data-view-more-next></span>
            </div>
            </body></html>"#
        )
    }

    const CARD: &str = r#"<article data-product-card data-page="2" data-product-id="sku-1">
        <div data-gallery data-image-ratio="portrait"></div>
    </article>"#;

    #[test]
    fn test_full_resolution() {
        let html = document(
            r#"data-section-id="main-collection""#,
            r#"data-last-page="3" data-columns="2""#,
            CARD,
        );

        let doc = resolve_document(&html).unwrap();
        assert_eq!(doc.section_id.as_deref(), Some("main-collection"));
        assert_eq!(doc.last_page, 3);
        assert_eq!(doc.columns, 2);
        assert_eq!(doc.ratio_attr.as_deref(), Some("portrait"));
        assert_eq!(doc.cards.len(), 1);
    }

    #[test]
    fn test_missing_root() {
        let err = resolve_document("<html><body></body></html>").unwrap_err();
        assert!(matches!(err, DomError::MissingRef("paginated-list")));
    }

    #[test]
    fn test_missing_sentinel() {
        let html = r#"<div data-paginated-list>
            <div data-product-grid data-last-page="3"></div>
            <span data-view-more-next></span>
        </div>"#;
        let err = resolve_document(html).unwrap_err();
        assert!(matches!(err, DomError::MissingRef("view-more-previous")));
    }

    #[test]
    fn test_missing_last_page() {
        let html = document("", "", CARD);
        let err = resolve_document(&html).unwrap_err();
        assert!(matches!(err, DomError::MissingAttr("data-last-page")));
    }

    #[test]
    fn test_empty_grid_is_missing_cards_ref() {
        let html = document("", r#"data-last-page="3""#, "");
        let err = resolve_document(&html).unwrap_err();
        assert!(matches!(err, DomError::MissingRef("cards")));
    }
}
