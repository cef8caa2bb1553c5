//! Section fragment parsing
//!
//! The section renderer returns raw HTML for one page of a product grid.
//! This module extracts the cards from such a fragment: the `[data-product-grid]`
//! marker is located, and its direct children carrying `data-product-card`
//! become [`CardSource`]s in document order.
//!
//! Markup contract per card:
//!
//! ```html
//! <article data-product-card data-page="2" data-product-id="sku-42" data-price="129900">
//!   <div data-gallery data-image-ratio="adapt">
//!     <img src="https://cdn.example/sku-42.jpg">
//!   </div>
//! </article>
//! ```

use scraper::{ElementRef, Html, Selector};

use crate::error::DomError;

/// Parse a selector that is a compile-time constant.
pub(crate) fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// One card extracted from a fragment, before it joins the live grid.
#[derive(Debug, Clone, PartialEq)]
pub struct CardSource {
    /// 1-indexed page this card was rendered for.
    pub page: u32,
    pub product_id: String,
    /// Price in minor units (cents), when the card carries one.
    pub price_cents: Option<i64>,
    pub gallery: Option<GallerySource>,
}

/// A card's media gallery as found in markup.
#[derive(Debug, Clone, PartialEq)]
pub struct GallerySource {
    /// Raw `data-image-ratio` attribute (`square|portrait|landscape|adapt`).
    pub ratio_attr: Option<String>,
    /// The gallery image source, if any.
    pub image_src: Option<String>,
}

/// Extract the product cards from a cached section fragment.
///
/// Returns the cards in document order. Fails if the grid marker is absent
/// or a card violates the attribute contract; callers treat both as a
/// malformed page and abort that render.
pub fn parse_grid_fragment(html: &str) -> Result<Vec<CardSource>, DomError> {
    let doc = Html::parse_fragment(html);
    let grid_sel = selector("[data-product-grid]");
    let grid = doc
        .select(&grid_sel)
        .next()
        .ok_or(DomError::MissingMarker("data-product-grid"))?;

    collect_cards(grid)
}

/// Collect `data-product-card` direct children of a grid element.
pub(crate) fn collect_cards(grid: ElementRef<'_>) -> Result<Vec<CardSource>, DomError> {
    let mut cards = Vec::new();
    for node in grid.children() {
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        if el.value().attr("data-product-card").is_none() {
            continue;
        }
        cards.push(parse_card(el)?);
    }
    Ok(cards)
}

fn parse_card(el: ElementRef<'_>) -> Result<CardSource, DomError> {
    let page_raw = el
        .value()
        .attr("data-page")
        .ok_or(DomError::MissingAttr("data-page"))?;
    let page = page_raw.parse::<u32>().map_err(|_| DomError::InvalidAttr {
        attr: "data-page",
        value: page_raw.to_string(),
    })?;
    let product_id = el
        .value()
        .attr("data-product-id")
        .ok_or(DomError::MissingAttr("data-product-id"))?
        .to_string();

    let price_cents = match el.value().attr("data-price") {
        Some(raw) => Some(raw.parse::<i64>().map_err(|_| DomError::InvalidAttr {
            attr: "data-price",
            value: raw.to_string(),
        })?),
        None => None,
    };

    let gallery_sel = selector("[data-gallery]");
    let img_sel = selector("img");
    let gallery = el.select(&gallery_sel).next().map(|g| GallerySource {
        ratio_attr: g.value().attr("data-image-ratio").map(str::to_string),
        image_src: g
            .select(&img_sel)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(str::to_string),
    });

    Ok(CardSource {
        page,
        product_id,
        price_cents,
        gallery,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(cards: &str) -> String {
        format!(r#"<div data-product-grid data-last-page="3">{cards}</div>"#)
    }

    #[test]
    fn test_cards_in_document_order() {
        let html = fragment(
            r#"
            <article data-product-card data-page="2" data-product-id="a"></article>
            <article data-product-card data-page="2" data-product-id="b"></article>
            <article data-product-card data-page="2" data-product-id="c"></article>
            "#,
        );

        let cards = parse_grid_fragment(&html).unwrap();
        let ids: Vec<_> = cards.iter().map(|c| c.product_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(cards.iter().all(|c| c.page == 2));
    }

    #[test]
    fn test_non_card_children_skipped() {
        let html = fragment(
            r#"
            <style>.grid {}</style>
            <article data-product-card data-page="1" data-product-id="a"></article>
            <div class="spacer"></div>
            "#,
        );

        let cards = parse_grid_fragment(&html).unwrap();
        assert_eq!(cards.len(), 1);
    }

    #[test]
    fn test_gallery_and_price_parsed() {
        let html = fragment(
            r#"
            <article data-product-card data-page="1" data-product-id="a" data-price="129900">
              <div data-gallery data-image-ratio="adapt">
                <img src="https://cdn.example/a.jpg">
              </div>
            </article>
            "#,
        );

        let cards = parse_grid_fragment(&html).unwrap();
        assert_eq!(cards[0].price_cents, Some(129900));
        let gallery = cards[0].gallery.as_ref().unwrap();
        assert_eq!(gallery.ratio_attr.as_deref(), Some("adapt"));
        assert_eq!(
            gallery.image_src.as_deref(),
            Some("https://cdn.example/a.jpg")
        );
    }

    #[test]
    fn test_missing_grid_marker() {
        let err = parse_grid_fragment("<div><p>not a grid</p></div>").unwrap_err();
        assert!(matches!(err, DomError::MissingMarker("data-product-grid")));
    }

    #[test]
    fn test_bad_page_attribute() {
        let html = fragment(r#"<article data-product-card data-page="two" data-product-id="a"></article>"#);
        let err = parse_grid_fragment(&html).unwrap_err();
        assert!(matches!(err, DomError::InvalidAttr { attr: "data-page", .. }));
    }

    #[test]
    fn test_missing_product_id() {
        let html = fragment(r#"<article data-product-card data-page="1"></article>"#);
        let err = parse_grid_fragment(&html).unwrap_err();
        assert!(matches!(err, DomError::MissingAttr("data-product-id")));
    }
}
