//! Image load tracking
//!
//! [`ImageStore`] owns one load per URL: the first `request()` spawns the
//! probe, every later one observes the same entry. While a load is in
//! flight, callers get a watch receiver that fires exactly once when the
//! load settles - the image "load event". Failed loads settle as
//! [`LoadState::Failed`]; callers fall back to a default ratio.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::probe::ImageProbe;

/// Per-URL load state as observed by callers.
#[derive(Debug, Clone)]
pub enum LoadState {
    /// Load in flight; the receiver fires when it settles.
    Loading(watch::Receiver<bool>),
    Ready {
        width: u32,
        height: u32,
    },
    Failed,
}

enum Entry {
    Loading(watch::Receiver<bool>),
    Ready { width: u32, height: u32 },
    Failed,
}

impl Entry {
    fn to_state(&self) -> LoadState {
        match self {
            Entry::Loading(rx) => LoadState::Loading(rx.clone()),
            Entry::Ready { width, height } => LoadState::Ready {
                width: *width,
                height: *height,
            },
            Entry::Failed => LoadState::Failed,
        }
    }
}

struct StoreInner {
    probe: Arc<dyn ImageProbe>,
    entries: Mutex<HashMap<String, Entry>>,
}

/// Shared image dimension store. Clones observe the same entries.
#[derive(Clone)]
pub struct ImageStore {
    inner: Arc<StoreInner>,
}

impl ImageStore {
    pub fn new(probe: Arc<dyn ImageProbe>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                probe,
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Current state of `url`, starting a load if this is the first request.
    pub fn request(&self, url: &str) -> LoadState {
        let mut entries = self.inner.entries.lock().unwrap();
        if let Some(entry) = entries.get(url) {
            return entry.to_state();
        }

        let (tx, rx) = watch::channel(false);
        entries.insert(url.to_string(), Entry::Loading(rx.clone()));
        drop(entries);

        let inner = Arc::clone(&self.inner);
        let url = url.to_string();
        tokio::spawn(async move {
            let result = inner.probe.dimensions(&url).await;
            let mut entries = inner.entries.lock().unwrap();
            match result {
                Ok((width, height)) => {
                    entries.insert(url, Entry::Ready { width, height });
                }
                Err(e) => {
                    tracing::debug!(%url, error = %e, "image probe failed");
                    entries.insert(url, Entry::Failed);
                }
            }
            drop(entries);
            let _ = tx.send(true);
        });

        LoadState::Loading(rx)
    }

    /// Current state of `url` without starting a load.
    pub fn state(&self, url: &str) -> Option<LoadState> {
        self.inner
            .entries
            .lock()
            .unwrap()
            .get(url)
            .map(Entry::to_state)
    }

    /// Record already-known dimensions (e.g. from markup attributes).
    pub fn insert_ready(&self, url: &str, width: u32, height: u32) {
        self.inner
            .entries
            .lock()
            .unwrap()
            .insert(url.to_string(), Entry::Ready { width, height });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::MediaError;

    struct FakeProbe {
        calls: Arc<AtomicUsize>,
        result: Result<(u32, u32), ()>,
    }

    #[async_trait]
    impl ImageProbe for FakeProbe {
        async fn dimensions(&self, _url: &str) -> Result<(u32, u32), MediaError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .map_err(|_| MediaError::Network("fake failure".to_string()))
        }
    }

    #[tokio::test]
    async fn test_load_settles_ready() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = ImageStore::new(Arc::new(FakeProbe {
            calls: Arc::clone(&calls),
            result: Ok((1600, 900)),
        }));

        let LoadState::Loading(mut rx) = store.request("https://cdn.example/a.jpg") else {
            panic!("first request should be loading");
        };
        rx.changed().await.unwrap();

        match store.state("https://cdn.example/a.jpg") {
            Some(LoadState::Ready { width, height }) => {
                assert_eq!((width, height), (1600, 900));
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_repeated_requests_share_one_load() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = ImageStore::new(Arc::new(FakeProbe {
            calls: Arc::clone(&calls),
            result: Ok((100, 100)),
        }));

        let first = store.request("https://cdn.example/a.jpg");
        let second = store.request("https://cdn.example/a.jpg");
        assert!(matches!(first, LoadState::Loading(_)));
        assert!(matches!(second, LoadState::Loading(_)));

        if let LoadState::Loading(mut rx) = first {
            rx.changed().await.unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_load_settles_failed() {
        let store = ImageStore::new(Arc::new(FakeProbe {
            calls: Arc::new(AtomicUsize::new(0)),
            result: Err(()),
        }));

        let LoadState::Loading(mut rx) = store.request("https://cdn.example/broken.jpg") else {
            panic!("first request should be loading");
        };
        rx.changed().await.unwrap();

        assert!(matches!(
            store.state("https://cdn.example/broken.jpg"),
            Some(LoadState::Failed)
        ));
    }

    #[tokio::test]
    async fn test_insert_ready_skips_probe() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = ImageStore::new(Arc::new(FakeProbe {
            calls: Arc::clone(&calls),
            result: Ok((1, 1)),
        }));

        store.insert_ready("https://cdn.example/known.jpg", 800, 1000);
        assert!(matches!(
            store.request("https://cdn.example/known.jpg"),
            LoadState::Ready {
                width: 800,
                height: 1000
            }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
