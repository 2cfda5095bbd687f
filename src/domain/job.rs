use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::report::AnalysisReport;

/// Lifecycle of one in-flight analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Complete,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Failed)
    }
}

/// Fixed, ordered stage list a worker advances through. Progress values are
/// attached to stages so two pollers can never disagree on ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub enum Stage {
    Initializing,
    FetchingContent,
    AnalyzingStructure,
    ExtractingMetadata,
    CheckingPageSpeed,
    GeneratingRecommendations,
    PreparingResults,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::Initializing,
        Stage::FetchingContent,
        Stage::AnalyzingStructure,
        Stage::ExtractingMetadata,
        Stage::CheckingPageSpeed,
        Stage::GeneratingRecommendations,
        Stage::PreparingResults,
    ];

    pub fn index(&self) -> usize {
        Stage::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Initializing => "Initializing",
            Stage::FetchingContent => "Fetching content",
            Stage::AnalyzingStructure => "Analyzing structure",
            Stage::ExtractingMetadata => "Extracting metadata",
            Stage::CheckingPageSpeed => "Checking page speed",
            Stage::GeneratingRecommendations => "Generating recommendations",
            Stage::PreparingResults => "Preparing results",
        }
    }

    /// Reported completion percentage while this stage is in flight.
    pub fn progress(&self) -> u8 {
        match self {
            Stage::Initializing => 5,
            Stage::FetchingContent => 20,
            Stage::AnalyzingStructure => 40,
            Stage::ExtractingMetadata => 55,
            Stage::CheckingPageSpeed => 70,
            Stage::GeneratingRecommendations => 85,
            Stage::PreparingResults => 95,
        }
    }
}

/// Immutable record of a job's state. Workers publish a fresh snapshot per
/// transition; pollers read whichever snapshot is current, so no reader
/// ever locks a worker.
#[derive(Debug, Clone)]
pub struct JobSnapshot {
    pub id: Uuid,
    pub url: String,
    pub status: JobStatus,
    pub stage: Stage,
    pub progress: u8,
    pub error: Option<String>,
    pub redirect: Option<String>,
    /// Results computed so far, surfaced only when the client explicitly
    /// asks for possibly-incomplete output.
    pub partial: Option<AnalysisReport>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobSnapshot {
    pub fn new(url: &str) -> Self {
        let now = Utc::now();
        JobSnapshot {
            id: Uuid::new_v4(),
            url: url.to_string(),
            status: JobStatus::Pending,
            stage: Stage::Initializing,
            progress: 0,
            error: None,
            redirect: None,
            partial: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_stage(&self, stage: Stage) -> Self {
        let mut next = self.clone();
        next.status = JobStatus::Running;
        next.stage = stage;
        next.progress = stage.progress();
        next.updated_at = Utc::now();
        next
    }

    pub fn with_partial(&self, partial: AnalysisReport) -> Self {
        let mut next = self.clone();
        next.partial = Some(partial);
        next.updated_at = Utc::now();
        next
    }

    pub fn completed(&self, redirect: String) -> Self {
        let mut next = self.clone();
        next.status = JobStatus::Complete;
        next.stage = Stage::PreparingResults;
        next.progress = 100;
        next.redirect = Some(redirect);
        next.updated_at = Utc::now();
        next
    }

    pub fn failed(&self, error: String) -> Self {
        let mut next = self.clone();
        next.status = JobStatus::Failed;
        next.error = Some(error);
        next.updated_at = Utc::now();
        next
    }
}
