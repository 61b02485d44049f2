//! In-flight request deduplication.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;
use tracing::trace;

use crate::error::FetchError;
use crate::fetch::Fetcher;

type CachedResponse = std::result::Result<Arc<str>, FetchError>;

/// Response cache keyed by URL.
///
/// The cell for a URL is inserted before its request settles, so concurrent
/// callers share one request. Failures are stored like successes and never
/// retried: content at a package@version URL does not change.
pub struct FetchCache {
    fetcher: Arc<dyn Fetcher>,
    entries: DashMap<String, Arc<OnceCell<CachedResponse>>>,
}

impl FetchCache {
    /// Create an empty cache in front of `fetcher`.
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            entries: DashMap::new(),
        }
    }

    /// Fetch `url`, or join the request already made for it.
    pub async fn fetch(&self, url: &str) -> CachedResponse {
        // Clone the cell out so no shard lock is held across the await.
        let cell = self.entries.entry(url.to_string()).or_default().clone();

        if cell.initialized() {
            trace!("Cache hit for {}", url);
        }

        cell.get_or_init(|| async {
            self.fetcher.fetch_text(url).await.map(Arc::from)
        })
        .await
        .clone()
    }

    /// Number of distinct URLs requested so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
