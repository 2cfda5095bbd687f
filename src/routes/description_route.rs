use actix_web::{post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::domain::page::ExtractedPage;
use crate::domain::url::NormalizedUrl;
use crate::errors::AnalysisError;
use crate::services::Orchestrator;

fn error_json(error: &AnalysisError) -> HttpResponse {
    HttpResponse::build(error.status_code()).json(json!({ "error": error.to_string() }))
}

#[derive(Deserialize)]
pub struct GenerateDescriptionBody {
    url: String,
    #[serde(default)]
    regenerate: bool,
}

/// Fetch the page and generate a description synchronously, independent of
/// the analysis pipeline. With `regenerate: false` an already-cached
/// description is returned as-is.
#[post("/generate-description")]
pub async fn generate_description(
    orchestrator: web::Data<Orchestrator>,
    body: web::Json<GenerateDescriptionBody>,
) -> HttpResponse {
    let url = match NormalizedUrl::parse(&body.url) {
        Ok(url) => url,
        Err(error) => return error_json(&error),
    };

    if !body.regenerate {
        if let Some(report) = orchestrator.cache().get_any(url.as_str()).await {
            if let Some(description) = &report.generated_description {
                return HttpResponse::Ok().json(json!({
                    "url": report.url,
                    "title": report.title,
                    "meta_description": report.meta_description,
                    "generated_description": description,
                    "confidence": report.confidence,
                }));
            }
        }
    }

    let html = match orchestrator.fetcher().fetch(url.as_str()).await {
        Ok(html) => html,
        Err(error) => return error_json(&error),
    };
    let page = ExtractedPage::from_html(&html, url.as_str());

    let generated = match orchestrator.generator().generate(&page).await {
        Ok(generated) => generated,
        Err(error) => return error_json(&error),
    };

    // Swap-on-success: the cached report keeps its old description until
    // the new one exists.
    if let Some(report) = orchestrator.cache().get_any(url.as_str()).await {
        let updated =
            report.with_description(generated.description.clone(), generated.confidence);
        orchestrator.cache().put(url.as_str(), updated).await;
    }

    HttpResponse::Ok().json(json!({
        "url": url.as_str(),
        "title": page.title,
        "meta_description": page.meta_description,
        "generated_description": generated.description,
        "confidence": generated.confidence,
    }))
}
