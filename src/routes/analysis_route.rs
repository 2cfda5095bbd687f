use actix_web::{get, post, web, HttpResponse};
use askama::Template;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::domain::report::AnalysisReport;
use crate::domain::url::NormalizedUrl;
use crate::errors::AnalysisError;
use crate::services::{Orchestrator, StartOutcome};

fn error_json(error: &AnalysisError) -> HttpResponse {
    HttpResponse::build(error.status_code()).json(json!({ "error": error.to_string() }))
}

#[derive(Deserialize)]
pub struct AnalyzeBody {
    url: String,
    /// Force a fresh analysis even when a fresh cached result exists.
    #[serde(default)]
    regenerate: bool,
}

#[post("/analyze")]
pub async fn analyze(
    orchestrator: web::Data<Orchestrator>,
    body: web::Json<AnalyzeBody>,
) -> HttpResponse {
    log::info!("Received URL for analysis: {}", body.url);

    let outcome = if body.regenerate {
        orchestrator.regenerate(&body.url).await
    } else {
        orchestrator.start(&body.url).await
    };

    match outcome {
        Ok(StartOutcome::CachedRedirect(redirect)) => {
            HttpResponse::Ok().json(json!({ "redirect": redirect }))
        }
        Ok(StartOutcome::Started(id)) => HttpResponse::Ok().json(json!({ "analysis_id": id })),
        Err(error) => error_json(&error),
    }
}

#[get("/status/{analysis_id}")]
pub async fn status_by_id(
    orchestrator: web::Data<Orchestrator>,
    path: web::Path<Uuid>,
) -> HttpResponse {
    match orchestrator.status_by_id(path.into_inner()).await {
        Some(status) => HttpResponse::Ok().json(status),
        None => HttpResponse::NotFound().json(json!({ "error": "Unknown analysis id" })),
    }
}

#[derive(Deserialize)]
pub struct StatusQuery {
    url: String,
}

#[get("/status")]
pub async fn status_by_url(
    orchestrator: web::Data<Orchestrator>,
    query: web::Query<StatusQuery>,
) -> HttpResponse {
    match orchestrator.status_by_url(&query.url).await {
        Ok(Some(status)) => HttpResponse::Ok().json(status),
        Ok(None) => {
            HttpResponse::NotFound().json(json!({ "error": "No analysis found for this URL" }))
        }
        Err(error) => error_json(&error),
    }
}

#[derive(Template)]
#[template(path = "result.html")]
struct ResultTemplate {
    url: String,
    incomplete: bool,
    overall_score: u8,
    title: String,
    meta_description: String,
    keywords: String,
    has_generated: bool,
    generated_description: String,
    confidence_percent: u8,
    metric_rows: Vec<MetricRow>,
    recommendations: Vec<String>,
    computed_at: String,
}

struct MetricRow {
    name: &'static str,
    score: String,
}

#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundTemplate {
    url: String,
}

fn metric_rows(report: &AnalysisReport) -> Vec<MetricRow> {
    let score_of = |score: Option<u8>| match score {
        Some(score) => format!("{}/100", score),
        None => "N/A".to_string(),
    };

    vec![
        MetricRow {
            name: "Meta tags",
            score: score_of(report.metrics.meta_analysis.as_ref().map(|m| m.score)),
        },
        MetricRow {
            name: "Content",
            score: score_of(report.metrics.content_analysis.as_ref().map(|m| m.score)),
        },
        MetricRow {
            name: "Technical",
            score: score_of(report.metrics.technical_analysis.as_ref().map(|m| m.score)),
        },
        MetricRow {
            name: "Mobile",
            score: score_of(report.metrics.mobile_analysis.as_ref().map(|m| m.score)),
        },
        MetricRow {
            name: "Page speed",
            score: match &report.metrics.pagespeed {
                Some(pagespeed) => format!("{:.0}/100", pagespeed.performance_score),
                None => "N/A".to_string(),
            },
        },
    ]
}

fn render_report(report: &AnalysisReport, incomplete: bool) -> HttpResponse {
    let template = ResultTemplate {
        url: report.url.clone(),
        incomplete,
        overall_score: report.overall_score,
        title: report.title.clone().unwrap_or_else(|| "(no title)".to_string()),
        meta_description: report
            .meta_description
            .clone()
            .unwrap_or_else(|| "(no description)".to_string()),
        keywords: report.keywords.clone().unwrap_or_else(|| "(none)".to_string()),
        has_generated: report.generated_description.is_some(),
        generated_description: report.generated_description.clone().unwrap_or_default(),
        confidence_percent: (report.confidence * 100.0).round() as u8,
        metric_rows: metric_rows(report),
        recommendations: report.recommendations.clone(),
        computed_at: report.computed_at.format("%Y-%m-%d %H:%M UTC").to_string(),
    };

    HttpResponse::Ok().body(template.render().unwrap())
}

#[derive(Deserialize)]
pub struct ResultsQuery {
    url: String,
    #[serde(default)]
    incomplete: bool,
}

/// Results dashboard. Serves the last completed analysis for the URL; a
/// partial result from a still-running or failed job is shown only when the
/// client explicitly opted in with `incomplete=true`.
#[get("/results")]
pub async fn results(
    orchestrator: web::Data<Orchestrator>,
    query: web::Query<ResultsQuery>,
) -> HttpResponse {
    let url = match NormalizedUrl::parse(&query.url) {
        Ok(url) => url,
        Err(error) => return error_json(&error),
    };

    if let Some(report) = orchestrator.cache().get_any(url.as_str()).await {
        return render_report(&report, false);
    }

    if query.incomplete {
        if let Some(job) = orchestrator.jobs().get_by_url(url.as_str()).await {
            if let Some(partial) = &job.partial {
                return render_report(partial, true);
            }
        }
    }

    HttpResponse::NotFound().body(
        NotFoundTemplate {
            url: url.into_string(),
        }
        .render()
        .unwrap(),
    )
}

#[derive(Deserialize)]
pub struct ClearCacheBody {
    url: String,
}

#[post("/clear-cache")]
pub async fn clear_cache(
    orchestrator: web::Data<Orchestrator>,
    body: web::Json<ClearCacheBody>,
) -> HttpResponse {
    let url = match NormalizedUrl::parse(&body.url) {
        Ok(url) => url,
        Err(error) => {
            return HttpResponse::build(error.status_code())
                .json(json!({ "success": false, "error": error.to_string() }))
        }
    };

    if orchestrator.cache().invalidate(url.as_str()).await {
        log::info!("Cleared cached analysis for {}", url);
        HttpResponse::Ok().json(json!({
            "success": true,
            "message": format!("Cleared cached analysis for {}", url),
        }))
    } else {
        HttpResponse::Ok().json(json!({
            "success": false,
            "error": format!("No cached analysis for {}", url),
        }))
    }
}
