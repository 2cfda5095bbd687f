use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::job::{JobSnapshot, JobStatus, Stage};
use crate::domain::page::ExtractedPage;
use crate::domain::report::{AnalysisReport, Metrics};
use crate::domain::url::NormalizedUrl;
use crate::errors::AnalysisError;
use crate::services::analyzers;
use crate::services::cache::ResultCache;
use crate::services::description::{DescriptionGenerator, GeneratedDescription};
use crate::services::fetcher::PageFetcher;
use crate::services::job_store::JobStore;
use crate::services::pagespeed::PagespeedClient;

/// What `start` handed back to the caller.
pub enum StartOutcome {
    /// A fresh cached result exists; no new work was scheduled.
    CachedRedirect(String),
    /// A worker was spawned; poll the job id.
    Started(Uuid),
}

/// Snapshot of a job's state as reported to pollers.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StatusResponse {
    pub status: JobStatus,
    pub stage: &'static str,
    pub stage_index: usize,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl StatusResponse {
    fn from_snapshot(snapshot: &JobSnapshot) -> Self {
        StatusResponse {
            status: snapshot.status,
            stage: snapshot.stage.label(),
            stage_index: snapshot.stage.index(),
            progress: snapshot.progress,
            error: snapshot.error.clone(),
            redirect: snapshot.redirect.clone(),
        }
    }
}

/// Sequences the analysis pipeline: one spawned worker per job advancing
/// the fixed stage list, external failures degraded to absent metrics,
/// completed results written to the cache.
#[derive(Clone)]
pub struct Orchestrator {
    jobs: Arc<JobStore>,
    cache: Arc<ResultCache>,
    fetcher: PageFetcher,
    pagespeed: PagespeedClient,
    generator: DescriptionGenerator,
}

impl Orchestrator {
    pub fn new(
        jobs: Arc<JobStore>,
        cache: Arc<ResultCache>,
        fetcher: PageFetcher,
        pagespeed: PagespeedClient,
        generator: DescriptionGenerator,
    ) -> Self {
        Orchestrator {
            jobs,
            cache,
            fetcher,
            pagespeed,
            generator,
        }
    }

    pub fn jobs(&self) -> &JobStore {
        &self.jobs
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn fetcher(&self) -> &PageFetcher {
        &self.fetcher
    }

    pub fn generator(&self) -> &DescriptionGenerator {
        &self.generator
    }

    /// Redirect target for a completed analysis. The URL is a query value,
    /// so it must be form-encoded or its own query string would be parsed
    /// as extra parameters of the results route.
    pub fn results_path(url: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(url.as_bytes()).collect();
        format!("/analysis/results?url={}", encoded)
    }

    /// Begin an analysis, reusing a fresh cached result when one exists.
    pub async fn start(&self, raw_url: &str) -> Result<StartOutcome, AnalysisError> {
        self.start_inner(raw_url, false).await
    }

    /// Begin an analysis, bypassing the cache freshness check.
    pub async fn regenerate(&self, raw_url: &str) -> Result<StartOutcome, AnalysisError> {
        self.start_inner(raw_url, true).await
    }

    async fn start_inner(
        &self,
        raw_url: &str,
        bypass_cache: bool,
    ) -> Result<StartOutcome, AnalysisError> {
        let url = NormalizedUrl::parse(raw_url)?;
        let url = url.into_string();

        if !bypass_cache {
            if let Some(cached) = self.cache.get_fresh(&url).await {
                log::info!("Serving cached analysis for {}", url);
                let redirect = Self::results_path(&cached.url);
                // Record a completed job so status polling by id works
                // the same whether work happened or not.
                let job = JobSnapshot::new(&url).completed(redirect.clone());
                self.jobs.insert(job).await;
                return Ok(StartOutcome::CachedRedirect(redirect));
            }
        }

        let job = self.jobs.insert(JobSnapshot::new(&url)).await;
        log::info!("Starting analysis job {} for {}", job.id, url);

        let this = self.clone();
        let worker_job = (*job).clone();
        tokio::spawn(async move {
            this.run_job(worker_job).await;
        });

        Ok(StartOutcome::Started(job.id))
    }

    /// Non-blocking read of job state by id.
    pub async fn status_by_id(&self, id: Uuid) -> Option<StatusResponse> {
        let snapshot = self.jobs.get(id).await?;
        Some(StatusResponse::from_snapshot(&snapshot))
    }

    /// Non-blocking read of job state by URL. Falls back to the cache when
    /// the job has already been garbage-collected.
    pub async fn status_by_url(&self, raw_url: &str) -> Result<Option<StatusResponse>, AnalysisError> {
        let url = NormalizedUrl::parse(raw_url)?;

        if let Some(snapshot) = self.jobs.get_by_url(url.as_str()).await {
            return Ok(Some(StatusResponse::from_snapshot(&snapshot)));
        }

        if let Some(cached) = self.cache.get_any(url.as_str()).await {
            return Ok(Some(StatusResponse {
                status: JobStatus::Complete,
                stage: Stage::PreparingResults.label(),
                stage_index: Stage::PreparingResults.index(),
                progress: 100,
                error: None,
                redirect: Some(Self::results_path(&cached.url)),
            }));
        }

        Ok(None)
    }

    /// The worker task. Runs to completion or failure regardless of
    /// whether anyone is still polling; the result is cached either way.
    async fn run_job(&self, job: JobSnapshot) {
        let url = job.url.clone();
        let job = self.jobs.update(job.with_stage(Stage::Initializing)).await;

        let job = self.jobs.update(job.with_stage(Stage::FetchingContent)).await;
        let html = match self.fetcher.fetch(&url).await {
            Ok(html) => html,
            Err(e) => {
                log::error!("Job {} failed fetching {}: {}", job.id, url, e);
                self.jobs.update(job.failed(e.to_string())).await;
                return;
            }
        };

        let job = self
            .jobs
            .update(job.with_stage(Stage::AnalyzingStructure))
            .await;
        // scraper types are not Send; extraction happens before the next
        // await point.
        let page = ExtractedPage::from_html(&html, &url);
        drop(html);

        let content = analyzers::content::analyze(&page);
        let technical = analyzers::technical::analyze(&page);
        let mobile = analyzers::mobile::analyze(&page);

        let job = self
            .jobs
            .update(job.with_stage(Stage::ExtractingMetadata))
            .await;
        let meta = analyzers::meta::analyze(&page);

        // Everything computable without external collaborators is now
        // known; publish it so a stalled poller can opt into viewing a
        // possibly-incomplete result.
        let metrics = Metrics {
            meta_analysis: Some(meta),
            content_analysis: Some(content),
            technical_analysis: Some(technical),
            mobile_analysis: Some(mobile),
            pagespeed: None,
        };
        let partial = build_report(&url, &page, metrics.clone(), None);
        let job = self.jobs.update(job.with_partial(partial)).await;

        let job = self
            .jobs
            .update(job.with_stage(Stage::CheckingPageSpeed))
            .await;
        let pagespeed = match self.pagespeed.fetch(&url).await {
            Ok(report) => Some(report),
            Err(e) => {
                log::warn!("PageSpeed metric degraded for {}: {}", url, e);
                None
            }
        };

        let job = self
            .jobs
            .update(job.with_stage(Stage::GeneratingRecommendations))
            .await;
        let description = match self.generator.generate(&page).await {
            Ok(generated) => Some(generated),
            Err(e) => {
                log::warn!("Description generation degraded for {}: {}", url, e);
                None
            }
        };

        let job = self
            .jobs
            .update(job.with_stage(Stage::PreparingResults))
            .await;
        let metrics = Metrics {
            pagespeed,
            ..metrics
        };
        let report = build_report(&url, &page, metrics, description);

        self.cache.put(&url, report).await;
        let redirect = Self::results_path(&url);
        let done = self.jobs.update(job.completed(redirect)).await;
        log::info!(
            "Job {} complete for {} (overall score from {} metrics)",
            done.id,
            url,
            done.partial
                .as_ref()
                .map(|p| p.metrics.available_scores().len())
                .unwrap_or(0)
        );
    }
}

/// Assemble a report from whatever metrics are available. Recommendations
/// keep the fixed facet order: meta, content, technical, mobile, pagespeed.
fn build_report(
    url: &str,
    page: &ExtractedPage,
    metrics: Metrics,
    description: Option<GeneratedDescription>,
) -> AnalysisReport {
    let mut recommendations = Vec::new();
    if let Some(meta) = &metrics.meta_analysis {
        recommendations.extend(meta.recommendations.iter().cloned());
    }
    if let Some(content) = &metrics.content_analysis {
        recommendations.extend(content.recommendations.iter().cloned());
    }
    if let Some(technical) = &metrics.technical_analysis {
        recommendations.extend(technical.recommendations.iter().cloned());
    }
    if let Some(mobile) = &metrics.mobile_analysis {
        recommendations.extend(mobile.recommendations.iter().cloned());
    }
    if let Some(pagespeed) = &metrics.pagespeed {
        recommendations.extend(pagespeed.recommendations.iter().cloned());
    }

    let (generated_description, confidence) = match description {
        Some(generated) => (Some(generated.description), generated.confidence),
        None => (None, 0.0),
    };

    let overall_score = metrics.overall_score();

    AnalysisReport {
        url: url.to_string(),
        title: page.title.clone(),
        meta_description: page.description_or_fallback(),
        keywords: page.meta_keywords.clone(),
        metrics,
        recommendations,
        generated_description,
        confidence,
        overall_score,
        computed_at: Utc::now(),
    }
}
