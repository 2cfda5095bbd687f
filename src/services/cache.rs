use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::domain::report::AnalysisReport;

struct CacheEntry {
    report: Arc<AnalysisReport>,
    stored_at: Instant,
}

/// In-memory store of completed analyses, keyed by normalized URL.
///
/// Entries are immutable `Arc`s, so a reader either sees the previous
/// report or the new one, never a partial write. `put` is last-write-wins.
pub struct ResultCache {
    ttl: Duration,
    inner: RwLock<HashMap<String, CacheEntry>>,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        ResultCache {
            ttl,
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Fresh entries only: used by `start` to decide whether to reuse.
    pub async fn get_fresh(&self, url: &str) -> Option<Arc<AnalysisReport>> {
        let guard = self.inner.read().await;
        guard
            .get(url)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.report.clone())
    }

    /// Any entry, stale included: the results view shows whatever was last
    /// computed for the URL.
    pub async fn get_any(&self, url: &str) -> Option<Arc<AnalysisReport>> {
        let guard = self.inner.read().await;
        guard.get(url).map(|entry| entry.report.clone())
    }

    pub async fn put(&self, url: &str, report: AnalysisReport) {
        let mut guard = self.inner.write().await;
        guard.insert(
            url.to_string(),
            CacheEntry {
                report: Arc::new(report),
                stored_at: Instant::now(),
            },
        );
    }

    /// Returns whether an entry existed.
    pub async fn invalidate(&self, url: &str) -> bool {
        let mut guard = self.inner.write().await;
        guard.remove(url).is_some()
    }

    /// Drop expired entries; returns how many were removed.
    pub async fn sweep_expired(&self) -> usize {
        let mut guard = self.inner.write().await;
        let before = guard.len();
        guard.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        before - guard.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::domain::report::Metrics;

    fn report(url: &str) -> AnalysisReport {
        AnalysisReport {
            url: url.to_string(),
            title: Some("Test".to_string()),
            meta_description: None,
            keywords: None,
            metrics: Metrics::default(),
            recommendations: vec![],
            generated_description: None,
            confidence: 0.0,
            overall_score: 50,
            computed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn put_then_get_fresh_roundtrips() {
        let cache = ResultCache::new(Duration::from_secs(60));
        cache.put("https://example.com", report("https://example.com")).await;

        let hit = cache.get_fresh("https://example.com").await.unwrap();
        assert_eq!(hit.url, "https://example.com");
    }

    #[tokio::test]
    async fn expired_entries_are_stale_but_still_viewable() {
        let cache = ResultCache::new(Duration::from_millis(0));
        cache.put("https://example.com", report("https://example.com")).await;

        assert!(cache.get_fresh("https://example.com").await.is_none());
        assert!(cache.get_any("https://example.com").await.is_some());
    }

    #[tokio::test]
    async fn invalidate_removes_the_entry() {
        let cache = ResultCache::new(Duration::from_secs(60));
        cache.put("https://example.com", report("https://example.com")).await;

        assert!(cache.invalidate("https://example.com").await);
        assert!(cache.get_any("https://example.com").await.is_none());
        // Second invalidation finds nothing
        assert!(!cache.invalidate("https://example.com").await);
    }

    #[tokio::test]
    async fn put_is_last_write_wins() {
        let cache = ResultCache::new(Duration::from_secs(60));
        let mut first = report("https://example.com");
        first.overall_score = 10;
        let mut second = report("https://example.com");
        second.overall_score = 90;

        cache.put("https://example.com", first).await;
        cache.put("https://example.com", second).await;

        let hit = cache.get_fresh("https://example.com").await.unwrap();
        assert_eq!(hit.overall_score, 90);
    }

    #[tokio::test]
    async fn sweep_drops_only_expired_entries() {
        let cache = ResultCache::new(Duration::from_millis(0));
        cache.put("https://a.com", report("https://a.com")).await;
        cache.put("https://b.com", report("https://b.com")).await;

        let removed = cache.sweep_expired().await;
        assert_eq!(removed, 2);
        assert!(cache.get_any("https://a.com").await.is_none());
    }
}
