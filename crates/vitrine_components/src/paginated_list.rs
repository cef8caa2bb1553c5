//! Paginated infinite-scroll product grid
//!
//! The component coordinates three responsibilities:
//!
//! 1. a **page cache** mapping page number to the raw HTML fragment the
//!    section renderer produced for it - filled once per page, never evicted
//! 2. a **prefetch coordinator**: one fetch slot per scroll direction with
//!    states `Idle → Fetching → Ready`. The slot's watch channel is the
//!    "page became available" signal a suspended render waits on, and the
//!    `Fetching` state structurally prevents duplicate fetches for a
//!    direction while one is in flight (the two directions are independent)
//! 3. a **scroll renderer** reacting to the two sentinels: splice the cached
//!    page into the grid, push the page URL onto session history, keep the
//!    viewport stable across prepends, then normalize new galleries on the
//!    next frame and queue the follow-up prefetch at idle priority
//!
//! Failure posture: a failed page fetch is not retried - its slot stays
//! `Fetching`, waiters never wake, and that direction simply stops
//! advancing. Pages outside `[1, last-page]` are silently "no more
//! content". A fragment without the expected grid marker aborts that
//! page's render.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};
use url::Url;

use vitrine_core::State;
use vitrine_dom::{
    page_url, parse_grid_fragment, resolve_document, IntersectionObserver, ProductGrid,
    SentinelKind, Viewport,
};
use vitrine_media::LoadState;

use crate::aspect::{self, RatioMode, DEFAULT_RATIO};
use crate::component::{Component, ComponentContext};
use crate::error::ComponentError;
use crate::money::format_money;

const DEFAULT_MONEY_FORMAT: &str = "${{amount}}";

/// Scroll direction, and therefore which sentinel and fetch slot apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    fn delta(self) -> i64 {
        match self {
            Direction::Previous => -1,
            Direction::Next => 1,
        }
    }

    fn index(self) -> usize {
        match self {
            Direction::Previous => 0,
            Direction::Next => 1,
        }
    }

    fn from_sentinel(kind: SentinelKind) -> Self {
        match kind {
            SentinelKind::ViewMorePrevious => Direction::Previous,
            SentinelKind::ViewMoreNext => Direction::Next,
        }
    }
}

/// The page a direction would load next: its number and the URL that
/// renders it. Derived from the extremal rendered card, never stored.
#[derive(Debug, Clone)]
pub struct PageDescriptor {
    pub page: u32,
    pub url: Url,
}

/// What a render pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The page's cards were spliced into the grid.
    Spliced { page: u32, cards: usize },
    /// The target page lies outside `[1, last-page]`; no more content.
    OutOfRange,
    /// A concurrent render already spliced this page; nothing to do.
    AlreadyRendered { page: u32 },
    /// The fetch signal fired but the page never reached the cache.
    Missing { page: u32 },
    /// The cached fragment lacks the expected structure.
    Malformed { page: u32 },
}

/// One card, summarized for hosts (prices formatted with the shop's money
/// format).
#[derive(Debug, Clone, Serialize)]
pub struct CardSummary {
    pub product_id: String,
    pub page: u32,
    pub ratio: Option<String>,
    pub price: Option<String>,
}

// ============================================================================
// Page cache
// ============================================================================

/// Page number → raw fragment HTML. Entries are added once and never
/// invalidated; the cache lives as long as the component.
struct PageCache {
    pages: HashMap<u32, String>,
}

impl PageCache {
    fn new() -> Self {
        Self {
            pages: HashMap::new(),
        }
    }

    fn get(&self, page: u32) -> Option<&String> {
        self.pages.get(&page)
    }

    fn contains(&self, page: u32) -> bool {
        self.pages.contains_key(&page)
    }

    fn insert(&mut self, page: u32, html: String) {
        self.pages.entry(page).or_insert(html);
    }
}

// ============================================================================
// Per-direction fetch slot
// ============================================================================

enum FetchState {
    Idle,
    /// A fetch is in flight. The sender is the one-shot availability
    /// signal; it stays alive (unsent) forever if the fetch fails, pinning
    /// the slot and stalling the direction.
    Fetching {
        page: u32,
        signal: watch::Sender<bool>,
    },
    Ready,
}

struct DirectionSlot {
    state: FetchState,
}

impl DirectionSlot {
    fn new() -> Self {
        Self {
            state: FetchState::Idle,
        }
    }

    /// Claim the slot for a fetch of `page`. Fails while a fetch is already
    /// in flight - the caller must not issue another.
    fn begin(&mut self, page: u32) -> bool {
        if matches!(self.state, FetchState::Fetching { .. }) {
            return false;
        }
        let (signal, _) = watch::channel(false);
        self.state = FetchState::Fetching { page, signal };
        true
    }

    /// Subscribe to the availability signal of an in-flight fetch for
    /// `page`, if one exists.
    fn subscribe(&self, page: u32) -> Option<watch::Receiver<bool>> {
        match &self.state {
            FetchState::Fetching {
                page: fetching,
                signal,
            } if *fetching == page => Some(signal.subscribe()),
            _ => None,
        }
    }

    /// The in-flight fetch finished: wake every waiter and mark ready.
    fn complete(&mut self) {
        let prev = std::mem::replace(&mut self.state, FetchState::Ready);
        if let FetchState::Fetching { signal, .. } = prev {
            let _ = signal.send(true);
        }
    }

    /// The page was already cached; mark ready without fetching. No-op
    /// while a fetch is in flight.
    fn ready(&mut self) {
        if !matches!(self.state, FetchState::Fetching { .. }) {
            self.state = FetchState::Ready;
        }
    }
}

// ============================================================================
// The component
// ============================================================================

struct ListState {
    grid: ProductGrid,
    viewport: Viewport,
    observer: IntersectionObserver,
    cache: PageCache,
    /// Fetch slots indexed by `Direction::index()`.
    slots: [DirectionSlot; 2],
    /// Pages whose cards are in the grid; a page is spliced at most once.
    rendered: HashSet<u32>,
    ratio_mode: RatioMode,
    connected: bool,
}

struct ListInner {
    section_id: String,
    money_format: String,
    ctx: ComponentContext,
    current_page: State<u32>,
    state: Mutex<ListState>,
}

/// The paginated infinite-scroll list. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct PaginatedList {
    inner: Arc<ListInner>,
}

impl std::fmt::Debug for PaginatedList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatedList")
            .field("section_id", &self.inner.section_id)
            .finish_non_exhaustive()
    }
}

impl PaginatedList {
    /// Bind the component to its host document.
    ///
    /// Resolves and validates every required reference up front: the host
    /// element and its `data-section-id`, both sentinels, the grid with its
    /// `data-last-page`, and the initial cards. Any absence is a
    /// configuration error.
    pub fn from_document(html: &str, ctx: ComponentContext) -> Result<Self, ComponentError> {
        let doc = resolve_document(html)?;
        let section_id = doc.section_id.ok_or(ComponentError::MissingSectionId)?;
        let money_format = doc
            .money_format
            .unwrap_or_else(|| DEFAULT_MONEY_FORMAT.to_string());
        let ratio_mode = RatioMode::from_attr(doc.ratio_attr.as_deref());

        let mut grid = ProductGrid::new(doc.columns, doc.last_page);
        grid.append(doc.cards);
        let rendered: HashSet<u32> = grid.cards().iter().map(|c| c.page).collect();
        let current_page = grid.last_card_page().unwrap_or(1);

        let viewport = Viewport::new(ctx.viewport_height);

        Ok(Self {
            inner: Arc::new(ListInner {
                section_id,
                money_format,
                ctx,
                current_page: State::new(current_page),
                state: Mutex::new(ListState {
                    grid,
                    viewport,
                    observer: IntersectionObserver::default(),
                    cache: PageCache::new(),
                    slots: [DirectionSlot::new(), DirectionSlot::new()],
                    rendered,
                    ratio_mode,
                    connected: false,
                }),
            }),
        })
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    fn activate(&self) {
        {
            let mut state = self.inner.state.lock().unwrap();
            if state.connected {
                return;
            }
            state.connected = true;
            state.observer.observe(SentinelKind::ViewMorePrevious);
            state.observer.observe(SentinelKind::ViewMoreNext);
        }

        // Warm both directions immediately so a render never finds an empty
        // slot under normal scrolling.
        for direction in [Direction::Previous, Direction::Next] {
            let list = self.clone();
            tokio::spawn(async move {
                list.prefetch(direction).await;
            });
        }

        // The initial cards get their galleries normalized too.
        self.schedule_normalize();
    }

    fn deactivate(&self) {
        let mut state = self.inner.state.lock().unwrap();
        state.observer.disconnect();
        state.connected = false;
    }

    // =========================================================================
    // Scroll handling
    // =========================================================================

    /// Report a new scroll offset. Sentinel transitions are evaluated, and
    /// every sentinel that entered the (margin-extended) viewport triggers a
    /// render of its direction, in entry order. An active view transition
    /// is awaited before any splice.
    pub async fn handle_scroll(&self, offset_y: f32) -> Vec<RenderOutcome> {
        let entries = {
            let mut state = self.inner.state.lock().unwrap();
            state.viewport.offset_y = offset_y;
            let positions = state.grid.sentinel_positions();
            let viewport = state.viewport;
            state.observer.check(&viewport, positions)
        };

        let triggered: Vec<Direction> = entries
            .iter()
            .filter(|e| e.is_intersecting)
            .map(|e| Direction::from_sentinel(e.target))
            .collect();
        if triggered.is_empty() {
            return Vec::new();
        }

        // Never mutate the grid while a view transition is snapshotting.
        self.inner.ctx.gate.wait_idle().await;

        let mut outcomes = Vec::with_capacity(triggered.len());
        for direction in triggered {
            outcomes.push(self.render(direction).await);
        }
        outcomes
    }

    /// Render the adjacent page in `direction`: resolve the target page,
    /// wait for its fragment if the prefetch is still in flight, splice its
    /// cards, update history, and schedule normalization plus the follow-up
    /// prefetch.
    pub async fn render(&self, direction: Direction) -> RenderOutcome {
        let descriptor = {
            let state = self.inner.state.lock().unwrap();
            match Self::descriptor(&state, &self.inner.ctx.base_url, direction) {
                Some(d) => d,
                None => return RenderOutcome::OutOfRange,
            }
        };

        let mut attempts = 0;
        let html = loop {
            let (cached, waiter) = {
                let state = self.inner.state.lock().unwrap();
                (
                    state.cache.get(descriptor.page).cloned(),
                    state.slots[direction.index()].subscribe(descriptor.page),
                )
            };
            if let Some(html) = cached {
                break html;
            }
            if attempts >= 2 {
                debug!(page = descriptor.page, "page missing after fetch signal");
                return RenderOutcome::Missing {
                    page: descriptor.page,
                };
            }
            attempts += 1;
            match waiter {
                Some(mut rx) => {
                    if rx.changed().await.is_err() {
                        return RenderOutcome::Missing {
                            page: descriptor.page,
                        };
                    }
                }
                // No fetch in flight yet (the sentinel fired before the
                // activation prefetch ran); issue it from the render path.
                None => self.prefetch(direction).await,
            }
        };

        let cards = match parse_grid_fragment(&html) {
            Ok(cards) if !cards.is_empty() => cards,
            Ok(_) => {
                debug!(page = descriptor.page, "fragment has no cards, skipping");
                return RenderOutcome::Malformed {
                    page: descriptor.page,
                };
            }
            Err(e) => {
                debug!(page = descriptor.page, error = %e, "malformed fragment, skipping");
                return RenderOutcome::Malformed {
                    page: descriptor.page,
                };
            }
        };
        let count = cards.len();

        {
            let mut state = self.inner.state.lock().unwrap();
            if !state.rendered.insert(descriptor.page) {
                return RenderOutcome::AlreadyRendered {
                    page: descriptor.page,
                };
            }

            match direction {
                Direction::Next => {
                    state.grid.append(cards);
                }
                Direction::Previous => {
                    // Keep the viewport visually still: shift the scroll
                    // offset by exactly how far the previously-first card
                    // moved down.
                    let first_top_before = state.grid.card_top(0);
                    let inserted = state.grid.prepend(cards);
                    let first_top_after = state.grid.card_top(inserted.len());
                    state.viewport.offset_y += first_top_after - first_top_before;
                }
            }
        }

        self.inner.current_page.set(descriptor.page);
        self.inner.ctx.history.push(&descriptor.url);
        self.schedule_normalize();
        self.schedule_idle_prefetch(direction);

        debug!(page = descriptor.page, cards = count, ?direction, "page spliced");
        RenderOutcome::Spliced {
            page: descriptor.page,
            cards: count,
        }
    }

    // =========================================================================
    // Prefetching
    // =========================================================================

    /// Fetch the adjacent page in `direction` into the cache. A no-op when
    /// the target is out of range, already cached, or already being fetched.
    async fn prefetch(&self, direction: Direction) {
        let descriptor = {
            let mut state = self.inner.state.lock().unwrap();
            let Some(d) = Self::descriptor(&state, &self.inner.ctx.base_url, direction) else {
                return;
            };
            if state.cache.contains(d.page) {
                state.slots[direction.index()].ready();
                return;
            }
            if !state.slots[direction.index()].begin(d.page) {
                return;
            }
            d
        };

        debug!(page = descriptor.page, ?direction, "prefetching page");
        let result = self
            .inner
            .ctx
            .renderer
            .section_html(&self.inner.section_id, true, &descriptor.url)
            .await;

        match result {
            Ok(html) => {
                let mut state = self.inner.state.lock().unwrap();
                state.cache.insert(descriptor.page, html);
                state.slots[direction.index()].complete();
            }
            Err(e) => {
                // Not retried; the slot stays Fetching and the direction
                // stalls until a full reload.
                warn!(page = descriptor.page, ?direction, error = %e, "page fetch failed, direction stalls");
            }
        }
    }

    fn descriptor(
        state: &ListState,
        base_url: &Url,
        direction: Direction,
    ) -> Option<PageDescriptor> {
        let anchor = match direction {
            Direction::Previous => state.grid.first_page()?,
            Direction::Next => state.grid.last_card_page()?,
        };
        let target = anchor as i64 + direction.delta();
        if target < 1 || target > state.grid.last_page() as i64 {
            return None;
        }
        let page = target as u32;
        Some(PageDescriptor {
            page,
            url: page_url(base_url, page),
        })
    }

    // =========================================================================
    // Deferred work
    // =========================================================================

    /// Queue gallery normalization for the next frame, after layout has
    /// settled.
    fn schedule_normalize(&self) {
        let list = self.clone();
        self.inner.ctx.scheduler.request_frame(move || {
            list.normalize_pending();
        });
    }

    fn normalize_pending(&self) {
        let deferred = {
            let mut state = self.inner.state.lock().unwrap();
            let mode = state.ratio_mode;
            // The ratio cache is scoped to this batch.
            let mut batch_cache = HashMap::new();
            aspect::normalize_batch(
                &mut state.grid,
                mode,
                &self.inner.ctx.images,
                &mut batch_cache,
            )
        };

        // Galleries whose image is still loading resolve on its load event.
        for pending in deferred {
            let list = self.clone();
            tokio::spawn(async move {
                let mut signal = pending.signal;
                let _ = signal.changed().await;
                let ratio = match list.inner.ctx.images.state(&pending.src) {
                    Some(LoadState::Ready { width, height }) => {
                        aspect::adaptive_ratio(width, height)
                    }
                    _ => DEFAULT_RATIO.to_string(),
                };
                let mut state = list.inner.state.lock().unwrap();
                if let Some(gallery) = state.grid.gallery_mut(pending.card) {
                    gallery.ratio = Some(ratio);
                }
            });
        }
    }

    /// Queue the follow-up prefetch for `direction` at idle priority, so it
    /// never competes with rendering work.
    fn schedule_idle_prefetch(&self, direction: Direction) {
        let list = self.clone();
        self.inner.ctx.scheduler.request_idle(move || {
            let list = list.clone();
            tokio::spawn(async move {
                list.prefetch(direction).await;
            });
        });
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Page of the most recently spliced content (initially the last
    /// rendered card's page).
    pub fn current_page(&self) -> u32 {
        self.inner.current_page.get()
    }

    /// Reactive handle to the current page, for hosts that bind to it.
    pub fn page_state(&self) -> State<u32> {
        self.inner.current_page.clone()
    }

    pub fn last_page(&self) -> u32 {
        self.inner.state.lock().unwrap().grid.last_page()
    }

    pub fn cards_len(&self) -> usize {
        self.inner.state.lock().unwrap().grid.len()
    }

    pub fn content_height(&self) -> f32 {
        self.inner.state.lock().unwrap().grid.content_height()
    }

    pub fn scroll_offset(&self) -> f32 {
        self.inner.state.lock().unwrap().viewport.offset_y
    }

    /// Snapshot of the rendered cards, prices formatted with the shop's
    /// money format.
    pub fn card_summaries(&self) -> Vec<CardSummary> {
        let state = self.inner.state.lock().unwrap();
        state
            .grid
            .cards()
            .iter()
            .map(|c| CardSummary {
                product_id: c.product_id.clone(),
                page: c.page,
                ratio: c.gallery.as_ref().and_then(|g| g.ratio.clone()),
                price: c
                    .price_cents
                    .map(|cents| format_money(cents, &self.inner.money_format)),
            })
            .collect()
    }
}

impl Component for PaginatedList {
    fn connected(&mut self) -> Result<(), ComponentError> {
        self.activate();
        Ok(())
    }

    fn disconnected(&mut self) {
        self.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_mapping() {
        assert_eq!(Direction::Previous.delta(), -1);
        assert_eq!(Direction::Next.delta(), 1);
        assert_eq!(
            Direction::from_sentinel(SentinelKind::ViewMorePrevious),
            Direction::Previous
        );
        assert_eq!(
            Direction::from_sentinel(SentinelKind::ViewMoreNext),
            Direction::Next
        );
    }

    #[test]
    fn test_page_cache_insert_once() {
        let mut cache = PageCache::new();
        cache.insert(2, "first".to_string());
        cache.insert(2, "second".to_string());
        assert_eq!(cache.get(2).unwrap(), "first");
        assert!(cache.contains(2));
        assert!(!cache.contains(3));
    }

    #[test]
    fn test_slot_rejects_concurrent_fetch() {
        let mut slot = DirectionSlot::new();
        assert!(slot.begin(2));
        assert!(!slot.begin(2));
        assert!(!slot.begin(3));

        slot.complete();
        // Ready again accepts a new fetch.
        assert!(slot.begin(3));
    }

    #[tokio::test]
    async fn test_slot_signal_wakes_waiters() {
        let mut slot = DirectionSlot::new();
        assert!(slot.begin(2));

        let mut a = slot.subscribe(2).unwrap();
        let mut b = slot.subscribe(2).unwrap();
        slot.complete();

        a.changed().await.unwrap();
        b.changed().await.unwrap();
        assert!(*a.borrow());
    }

    #[test]
    fn test_idle_slot_has_no_signal() {
        let slot = DirectionSlot::new();
        assert!(slot.subscribe(2).is_none());
    }

    #[test]
    fn test_slot_signal_is_page_specific() {
        let mut slot = DirectionSlot::new();
        assert!(slot.begin(2));
        assert!(slot.subscribe(3).is_none());
        assert!(slot.subscribe(2).is_some());
    }

    #[test]
    fn test_ready_does_not_clobber_inflight_fetch() {
        let mut slot = DirectionSlot::new();
        assert!(slot.begin(2));
        slot.ready();
        assert!(slot.subscribe(2).is_some());
    }
}
