//! The live product grid
//!
//! Owns the rendered cards and answers the geometry questions scroll
//! rendering needs: where a card sits vertically, how tall the content is,
//! and where the two sentinels live. Cards are appended or prepended, never
//! removed.
//!
//! Layout is columnar: cards flow into rows of `columns`, each row as tall
//! as its tallest card, rows separated by `gap`. A card's height is its
//! chrome (title/price block) plus the gallery height derived from the
//! applied aspect ratio (width / ratio); galleries with no ratio applied yet
//! measure as ratio 1.

use crate::fragment::CardSource;
use crate::viewport::SentinelPositions;

/// Stable identity of a card within one grid, independent of index shifts
/// caused by prepends.
pub type CardId = u64;

/// A card's media gallery in the live grid.
#[derive(Debug, Clone)]
pub struct Gallery {
    pub image_src: Option<String>,
    /// Applied aspect-ratio string (e.g. `"1.778"`), once normalized.
    pub ratio: Option<String>,
    /// Persistent marker: set when a normalization batch has handled this
    /// gallery; later batches skip it.
    pub processed: bool,
}

/// One rendered product card.
#[derive(Debug, Clone)]
pub struct Card {
    pub id: CardId,
    /// 1-indexed page the card belongs to.
    pub page: u32,
    pub product_id: String,
    pub price_cents: Option<i64>,
    pub gallery: Option<Gallery>,
}

/// The live grid: rendered cards plus layout metrics.
#[derive(Debug)]
pub struct ProductGrid {
    columns: usize,
    card_width: f32,
    gap: f32,
    chrome: f32,
    last_page: u32,
    next_id: CardId,
    cards: Vec<Card>,
}

const DEFAULT_CARD_WIDTH: f32 = 280.0;
const DEFAULT_GAP: f32 = 16.0;
const DEFAULT_CHROME: f32 = 96.0;

impl ProductGrid {
    /// Create an empty grid. `last_page` is the fixed upper pagination bound
    /// published by the grid container.
    pub fn new(columns: usize, last_page: u32) -> Self {
        Self {
            columns: columns.max(1),
            card_width: DEFAULT_CARD_WIDTH,
            gap: DEFAULT_GAP,
            chrome: DEFAULT_CHROME,
            last_page,
            next_id: 0,
            cards: Vec::new(),
        }
    }

    /// Override layout metrics (card width, row gap, card chrome height).
    pub fn set_metrics(&mut self, card_width: f32, gap: f32, chrome: f32) {
        self.card_width = card_width;
        self.gap = gap;
        self.chrome = chrome;
    }

    pub fn last_page(&self) -> u32 {
        self.last_page
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn cards_mut(&mut self) -> &mut [Card] {
        &mut self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Page of the first rendered card.
    pub fn first_page(&self) -> Option<u32> {
        self.cards.first().map(|c| c.page)
    }

    /// Page of the last rendered card.
    pub fn last_card_page(&self) -> Option<u32> {
        self.cards.last().map(|c| c.page)
    }

    /// Append cards after the existing ones, preserving their relative
    /// order. Returns the assigned ids.
    pub fn append(&mut self, sources: Vec<CardSource>) -> Vec<CardId> {
        let mut ids = Vec::with_capacity(sources.len());
        for source in sources {
            let card = self.adopt(source);
            ids.push(card.id);
            self.cards.push(card);
        }
        ids
    }

    /// Prepend cards before the existing ones, preserving their relative
    /// order. Returns the assigned ids.
    pub fn prepend(&mut self, sources: Vec<CardSource>) -> Vec<CardId> {
        let mut ids = Vec::with_capacity(sources.len());
        for (offset, source) in sources.into_iter().enumerate() {
            let card = self.adopt(source);
            ids.push(card.id);
            self.cards.insert(offset, card);
        }
        ids
    }

    fn adopt(&mut self, source: CardSource) -> Card {
        let id = self.next_id;
        self.next_id += 1;
        Card {
            id,
            page: source.page,
            product_id: source.product_id,
            price_cents: source.price_cents,
            gallery: source.gallery.map(|g| Gallery {
                image_src: g.image_src,
                ratio: None,
                processed: false,
            }),
        }
    }

    /// Look up a card's current index by id.
    pub fn card_index(&self, id: CardId) -> Option<usize> {
        self.cards.iter().position(|c| c.id == id)
    }

    /// Mutable access to a card's gallery by id.
    pub fn gallery_mut(&mut self, id: CardId) -> Option<&mut Gallery> {
        self.cards
            .iter_mut()
            .find(|c| c.id == id)
            .and_then(|c| c.gallery.as_mut())
    }

    /// Height of one card: chrome plus gallery height at its applied ratio.
    pub fn card_height(&self, card: &Card) -> f32 {
        let ratio = card
            .gallery
            .as_ref()
            .and_then(|g| g.ratio.as_deref())
            .and_then(|r| r.parse::<f32>().ok())
            .filter(|r| *r > 0.0)
            .unwrap_or(1.0);
        self.chrome + self.card_width / ratio
    }

    fn row_heights(&self) -> Vec<f32> {
        self.cards
            .chunks(self.columns)
            .map(|row| {
                row.iter()
                    .map(|c| self.card_height(c))
                    .fold(0.0_f32, f32::max)
            })
            .collect()
    }

    /// Vertical position of the card at `index` (top edge, grid-relative).
    pub fn card_top(&self, index: usize) -> f32 {
        let row = index / self.columns;
        self.row_heights()
            .iter()
            .take(row)
            .map(|h| h + self.gap)
            .sum()
    }

    /// Total content height of the grid.
    pub fn content_height(&self) -> f32 {
        let rows = self.row_heights();
        if rows.is_empty() {
            return 0.0;
        }
        let gaps = (rows.len() - 1) as f32 * self.gap;
        rows.iter().sum::<f32>() + gaps
    }

    /// Positions of the two sentinels: just above the first card and just
    /// below the last.
    pub fn sentinel_positions(&self) -> SentinelPositions {
        SentinelPositions {
            previous: 0.0,
            next: self.content_height(),
        }
    }
}
