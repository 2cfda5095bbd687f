use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::job::JobSnapshot;

#[derive(Default)]
struct JobStoreInner {
    jobs: HashMap<Uuid, Arc<JobSnapshot>>,
    /// Latest job per URL, for status-by-url and partial-result lookup.
    by_url: HashMap<String, Uuid>,
}

/// Process-wide registry of analysis jobs.
///
/// A job is mutated only by its own worker, which publishes whole
/// immutable snapshots; pollers clone an `Arc` and go. The store enforces
/// that stage and progress never move backwards for a given job, whatever
/// order snapshots arrive in.
pub struct JobStore {
    inner: RwLock<JobStoreInner>,
}

impl JobStore {
    pub fn new() -> Self {
        JobStore {
            inner: RwLock::new(JobStoreInner::default()),
        }
    }

    pub async fn insert(&self, snapshot: JobSnapshot) -> Arc<JobSnapshot> {
        let snapshot = Arc::new(snapshot);
        let mut guard = self.inner.write().await;
        guard.by_url.insert(snapshot.url.clone(), snapshot.id);
        guard.jobs.insert(snapshot.id, snapshot.clone());
        snapshot
    }

    /// Atomically replace a job's snapshot, clamping stage/progress so
    /// they are monotonically non-decreasing.
    pub async fn update(&self, mut snapshot: JobSnapshot) -> Arc<JobSnapshot> {
        let mut guard = self.inner.write().await;
        if let Some(previous) = guard.jobs.get(&snapshot.id) {
            if previous.stage > snapshot.stage {
                snapshot.stage = previous.stage;
            }
            if previous.progress > snapshot.progress {
                snapshot.progress = previous.progress;
            }
        }
        let snapshot = Arc::new(snapshot);
        guard.jobs.insert(snapshot.id, snapshot.clone());
        snapshot
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<JobSnapshot>> {
        let guard = self.inner.read().await;
        guard.jobs.get(&id).cloned()
    }

    pub async fn get_by_url(&self, url: &str) -> Option<Arc<JobSnapshot>> {
        let guard = self.inner.read().await;
        guard
            .by_url
            .get(url)
            .and_then(|id| guard.jobs.get(id))
            .cloned()
    }

    /// Drop terminal jobs older than the retention window. Running jobs
    /// are never collected.
    pub async fn sweep_terminal(&self, retention: Duration) -> usize {
        let cutoff = Utc::now() - retention;
        let mut guard = self.inner.write().await;

        let expired: Vec<Uuid> = guard
            .jobs
            .values()
            .filter(|job| job.status.is_terminal() && job.updated_at < cutoff)
            .map(|job| job.id)
            .collect();

        for id in &expired {
            if let Some(job) = guard.jobs.remove(id) {
                if guard.by_url.get(&job.url) == Some(id) {
                    guard.by_url.remove(&job.url);
                }
            }
        }
        expired.len()
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::{JobStatus, Stage};

    #[tokio::test]
    async fn progress_never_decreases_between_updates() {
        let store = JobStore::new();
        let job = store.insert(JobSnapshot::new("https://example.com")).await;

        let advanced = store
            .update(job.with_stage(Stage::CheckingPageSpeed))
            .await;
        assert_eq!(advanced.progress, Stage::CheckingPageSpeed.progress());

        // A late-arriving snapshot from an earlier stage cannot move
        // progress backwards.
        let stale = store.update(job.with_stage(Stage::FetchingContent)).await;
        assert_eq!(stale.stage, Stage::CheckingPageSpeed);
        assert_eq!(stale.progress, Stage::CheckingPageSpeed.progress());
    }

    #[tokio::test]
    async fn lookup_by_url_returns_the_latest_job() {
        let store = JobStore::new();
        store.insert(JobSnapshot::new("https://example.com")).await;
        let second = store.insert(JobSnapshot::new("https://example.com")).await;

        let found = store.get_by_url("https://example.com").await.unwrap();
        assert_eq!(found.id, second.id);
    }

    #[tokio::test]
    async fn sweep_collects_only_old_terminal_jobs() {
        let store = JobStore::new();
        let running = store.insert(JobSnapshot::new("https://running.com")).await;
        let running = store
            .update(running.with_stage(Stage::FetchingContent))
            .await;

        let mut done = JobSnapshot::new("https://done.com");
        done.status = JobStatus::Complete;
        done.updated_at = Utc::now() - Duration::hours(2);
        store.insert(done).await;

        let removed = store.sweep_terminal(Duration::hours(1)).await;
        assert_eq!(removed, 1);
        assert!(store.get(running.id).await.is_some());
        assert!(store.get_by_url("https://done.com").await.is_none());
    }
}
