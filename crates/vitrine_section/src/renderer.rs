//! Section renderer implementations
//!
//! [`HttpSectionRenderer`] asks the storefront to render one section for a
//! given URL via the section rendering endpoint (`?section_id=...`).
//! [`CachedSectionRenderer`] wraps any renderer with an LRU fragment cache
//! keyed by section and URL; the `use_cache` flag selects whether a cached
//! fragment may be served.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use async_trait::async_trait;
use lru::LruCache;
use url::Url;

use crate::error::SectionError;

const DEFAULT_CACHE_CAPACITY: usize = 32;

/// Renders a section of storefront markup for a URL.
#[async_trait]
pub trait SectionRenderer: Send + Sync {
    /// Return the HTML fragment for `url`'s rendering of section
    /// `section_id`. `use_cache` permits serving a previously fetched
    /// fragment.
    async fn section_html(
        &self,
        section_id: &str,
        use_cache: bool,
        url: &Url,
    ) -> Result<String, SectionError>;
}

/// Plain HTTP renderer. Always fetches; wrap in [`CachedSectionRenderer`]
/// to honor `use_cache`.
pub struct HttpSectionRenderer {
    client: reqwest::Client,
}

impl HttpSectionRenderer {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpSectionRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SectionRenderer for HttpSectionRenderer {
    async fn section_html(
        &self,
        section_id: &str,
        _use_cache: bool,
        url: &Url,
    ) -> Result<String, SectionError> {
        let mut request_url = url.clone();
        request_url
            .query_pairs_mut()
            .append_pair("section_id", section_id);

        tracing::debug!(%request_url, "fetching section");
        let response = self
            .client
            .get(request_url.as_str())
            .send()
            .await
            .map_err(|e| SectionError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SectionError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| SectionError::Network(e.to_string()))
    }
}

/// LRU caching wrapper around any [`SectionRenderer`].
pub struct CachedSectionRenderer<R> {
    inner: R,
    cache: Mutex<LruCache<String, String>>,
}

impl<R: SectionRenderer> CachedSectionRenderer<R> {
    pub fn new(inner: R) -> Self {
        Self::with_capacity(
            inner,
            NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).expect("nonzero capacity"),
        )
    }

    pub fn with_capacity(inner: R, capacity: NonZeroUsize) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }
}

#[async_trait]
impl<R: SectionRenderer> SectionRenderer for CachedSectionRenderer<R> {
    async fn section_html(
        &self,
        section_id: &str,
        use_cache: bool,
        url: &Url,
    ) -> Result<String, SectionError> {
        let key = format!("{section_id}|{url}");

        if use_cache {
            if let Some(html) = self.cache.lock().unwrap().get(&key) {
                tracing::debug!(%url, section_id, "section cache hit");
                return Ok(html.clone());
            }
        }

        let html = self.inner.section_html(section_id, use_cache, url).await?;
        self.cache.lock().unwrap().put(key, html.clone());
        Ok(html)
    }
}
