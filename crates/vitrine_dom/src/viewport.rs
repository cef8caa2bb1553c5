//! Viewport and sentinel intersection sensing
//!
//! The infinite-scroll component never reacts to raw scroll positions; it
//! reacts to its two sentinels entering or leaving the viewport (with a
//! 100px margin, so loading starts slightly before the edge is visible).
//!
//! [`IntersectionObserver`] reproduces the browser observer's contract:
//! an entry is emitted for every observed target on the first check after
//! `observe()`, and afterwards only on transitions. Entries are emitted in
//! observation order.

use smallvec::SmallVec;

/// Default root margin around the viewport, in pixels.
pub const SENTINEL_MARGIN: f32 = 100.0;

/// The scrollable viewport over the grid. `offset_y` grows as the user
/// scrolls down; `0.0` is the top of the grid content.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub offset_y: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(height: f32) -> Self {
        Self {
            offset_y: 0.0,
            height,
        }
    }

    /// Whether a content-relative `y` falls inside the viewport extended by
    /// `margin` on both ends.
    pub fn contains(&self, y: f32, margin: f32) -> bool {
        y >= self.offset_y - margin && y <= self.offset_y + self.height + margin
    }
}

/// The two pagination sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentinelKind {
    ViewMorePrevious,
    ViewMoreNext,
}

/// Current vertical positions of both sentinels, grid-relative.
#[derive(Debug, Clone, Copy)]
pub struct SentinelPositions {
    pub previous: f32,
    pub next: f32,
}

impl SentinelPositions {
    fn get(&self, kind: SentinelKind) -> f32 {
        match kind {
            SentinelKind::ViewMorePrevious => self.previous,
            SentinelKind::ViewMoreNext => self.next,
        }
    }
}

/// One observation record.
#[derive(Debug, Clone, Copy)]
pub struct IntersectionEntry {
    pub target: SentinelKind,
    pub is_intersecting: bool,
}

struct Target {
    kind: SentinelKind,
    /// `None` until the first check after `observe()`.
    was_intersecting: Option<bool>,
}

/// Transition-edge intersection sensing for the sentinels.
pub struct IntersectionObserver {
    margin: f32,
    targets: SmallVec<[Target; 2]>,
}

impl IntersectionObserver {
    pub fn new(margin: f32) -> Self {
        Self {
            margin,
            targets: SmallVec::new(),
        }
    }

    /// Start observing a sentinel. Re-observing is a no-op; observation
    /// order determines entry order.
    pub fn observe(&mut self, kind: SentinelKind) {
        if self.targets.iter().any(|t| t.kind == kind) {
            return;
        }
        self.targets.push(Target {
            kind,
            was_intersecting: None,
        });
    }

    pub fn unobserve(&mut self, kind: SentinelKind) {
        self.targets.retain(|t| t.kind != kind);
    }

    /// Stop observing everything.
    pub fn disconnect(&mut self) {
        self.targets.clear();
    }

    /// Evaluate all observed sentinels against the viewport, emitting one
    /// entry per target whose intersection state changed (or that has never
    /// reported), in observation order.
    pub fn check(
        &mut self,
        viewport: &Viewport,
        positions: SentinelPositions,
    ) -> SmallVec<[IntersectionEntry; 2]> {
        let mut entries = SmallVec::new();
        for target in &mut self.targets {
            let now = viewport.contains(positions.get(target.kind), self.margin);
            if target.was_intersecting != Some(now) {
                target.was_intersecting = Some(now);
                entries.push(IntersectionEntry {
                    target: target.kind,
                    is_intersecting: now,
                });
            }
        }
        entries
    }
}

impl Default for IntersectionObserver {
    fn default() -> Self {
        Self::new(SENTINEL_MARGIN)
    }
}
