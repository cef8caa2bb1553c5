//! Collection crawling via the infinite-scroll component
//!
//! Fetches the collection page, binds a [`PaginatedList`] to it exactly as
//! a storefront host would, then simulates scrolling to one edge step by
//! step. Every card that enters the grid is printed as one JSON line.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use url::Url;

use vitrine_components::{Component, ComponentContext, PaginatedList, RenderOutcome};
use vitrine_core::{FrameScheduler, TransitionGate};
use vitrine_dom::SessionHistory;
use vitrine_media::{HttpImageProbe, ImageStore};
use vitrine_section::{CachedSectionRenderer, HttpSectionRenderer};

pub struct CrawlOptions {
    pub url: Url,
    pub pages: u32,
    pub backwards: bool,
    pub viewport: f32,
}

pub async fn crawl(opts: CrawlOptions) -> Result<()> {
    let client = reqwest::Client::new();
    let html = client
        .get(opts.url.as_str())
        .send()
        .await
        .context("fetch storefront page")?
        .error_for_status()?
        .text()
        .await?;

    let scheduler = FrameScheduler::new();
    let history = Arc::new(SessionHistory::new());
    let ctx = ComponentContext {
        renderer: Arc::new(CachedSectionRenderer::new(
            HttpSectionRenderer::with_client(client.clone()),
        )),
        images: ImageStore::new(Arc::new(HttpImageProbe::with_client(client))),
        history: history.clone(),
        gate: TransitionGate::new(),
        scheduler: scheduler.handle(),
        base_url: opts.url.clone(),
        viewport_height: opts.viewport,
    };

    let mut list = PaginatedList::from_document(&html, ctx).context("bind paginated list")?;
    list.connected()?;
    scheduler.run_frame();

    let mut seen = 0;
    emit_new(&list, &mut seen)?;

    for _ in 0..opts.pages {
        // Re-check at the current offset so a sentinel that moved away
        // registers its exit before we jump to the new edge.
        list.handle_scroll(list.scroll_offset()).await;

        let target = if opts.backwards {
            0.0
        } else {
            (list.content_height() - opts.viewport).max(0.0)
        };
        let outcomes = list.handle_scroll(target).await;
        scheduler.run_frame();

        if !outcomes.is_empty()
            && outcomes
                .iter()
                .all(|o| matches!(o, RenderOutcome::OutOfRange))
        {
            info!("no more pages");
            break;
        }
        emit_new(&list, &mut seen)?;
    }

    if let Some(url) = history.current() {
        info!(%url, "final history entry");
    }
    info!(
        cards = list.cards_len(),
        page = list.current_page(),
        "crawl finished"
    );
    Ok(())
}

/// Print cards added since the last call, one JSON object per line.
fn emit_new(list: &PaginatedList, seen: &mut usize) -> Result<()> {
    let summaries = list.card_summaries();
    for card in &summaries[*seen..] {
        println!("{}", serde_json::to_string(card)?);
    }
    *seen = summaries.len();
    Ok(())
}
