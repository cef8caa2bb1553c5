//! Session history
//!
//! Splicing a new page into the grid updates the address bar without a
//! navigation: the `page` query parameter is rewritten and any fragment is
//! cleared. The [`History`] trait is the seam; [`SessionHistory`] is the
//! recording implementation used by hosts and tests.

use std::sync::Mutex;

use url::Url;

/// Session history sink.
pub trait History: Send + Sync {
    /// Push a URL onto the session history without navigating.
    fn push(&self, url: &Url);
}

/// In-memory history stack.
#[derive(Debug, Default)]
pub struct SessionHistory {
    entries: Mutex<Vec<Url>>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// All pushed URLs, oldest first.
    pub fn entries(&self) -> Vec<Url> {
        self.entries.lock().unwrap().clone()
    }

    /// The most recently pushed URL.
    pub fn current(&self) -> Option<Url> {
        self.entries.lock().unwrap().last().cloned()
    }
}

impl History for SessionHistory {
    fn push(&self, url: &Url) {
        tracing::debug!(%url, "history push");
        self.entries.lock().unwrap().push(url.clone());
    }
}

/// Derive the URL for `page` from a base URL: the `page` query parameter is
/// replaced (or added) and the fragment is cleared. All other query
/// parameters are preserved.
pub fn page_url(base: &Url, page: u32) -> Url {
    let mut url = base.clone();
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "page")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.set_fragment(None);
    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair("page", &page.to_string());
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_url_adds_parameter() {
        let base = Url::parse("https://shop.example/collections/all").unwrap();
        let url = page_url(&base, 3);
        assert_eq!(url.as_str(), "https://shop.example/collections/all?page=3");
    }

    #[test]
    fn test_page_url_replaces_existing_page() {
        let base = Url::parse("https://shop.example/collections/all?sort=price&page=2").unwrap();
        let url = page_url(&base, 5);
        assert_eq!(
            url.as_str(),
            "https://shop.example/collections/all?sort=price&page=5"
        );
    }

    #[test]
    fn test_page_url_clears_fragment() {
        let base = Url::parse("https://shop.example/collections/all?page=1#grid-top").unwrap();
        let url = page_url(&base, 2);
        assert_eq!(url.fragment(), None);
        assert_eq!(url.as_str(), "https://shop.example/collections/all?page=2");
    }

    #[test]
    fn test_session_history_records_in_order() {
        let history = SessionHistory::new();
        let a = Url::parse("https://shop.example/?page=2").unwrap();
        let b = Url::parse("https://shop.example/?page=3").unwrap();

        history.push(&a);
        history.push(&b);

        assert_eq!(history.entries(), vec![a, b.clone()]);
        assert_eq!(history.current(), Some(b));
    }
}
