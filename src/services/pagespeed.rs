use std::time::Duration;

use anyhow::Context;
use serde_json::Value;

use crate::configuration::PagespeedSettings;
use crate::domain::report::PagespeedReport;
use crate::errors::AnalysisError;

/// Wrapper around the Google PageSpeed Insights v5 API. Failures degrade
/// the pagespeed metric; they never fail the surrounding job.
#[derive(Clone)]
pub struct PagespeedClient {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

#[derive(serde::Serialize)]
struct PagespeedQuery<'a> {
    url: &'a str,
    key: &'a str,
}

impl PagespeedClient {
    pub fn new(settings: &PagespeedSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .expect("Failed to build HTTP client");

        PagespeedClient {
            client,
            api_key: settings.api_key.clone(),
            api_url: settings.api_url.clone(),
        }
    }

    pub async fn fetch(&self, url: &str) -> Result<PagespeedReport, AnalysisError> {
        if self.api_key.is_empty() {
            return Err(AnalysisError::ExternalService(
                "PageSpeed Insights API key is not configured".to_string(),
            ));
        }

        log::info!("Calling PageSpeed API for: {}", url);

        let response = self
            .client
            .get(&self.api_url)
            .query(&PagespeedQuery {
                url,
                key: &self.api_key,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalysisError::ExternalService("PageSpeed API timed out".to_string())
                } else {
                    AnalysisError::ExternalService(format!("PageSpeed API error: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::ExternalService(format!(
                "PageSpeed API returned HTTP {}",
                status.as_u16()
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            AnalysisError::ExternalService(format!("Malformed PageSpeed response: {}", e))
        })?;

        parse_pagespeed_response(&body)
            .map_err(|e| AnalysisError::ExternalService(format!("{:#}", e)))
    }
}

/// Extract the lighthouse performance score, Core Web Vitals display values
/// and the top five low-scoring audits.
fn parse_pagespeed_response(body: &Value) -> anyhow::Result<PagespeedReport> {
    let lighthouse = body
        .get("lighthouseResult")
        .context("missing lighthouseResult")?;

    let performance_score = lighthouse
        .pointer("/categories/performance/score")
        .and_then(Value::as_f64)
        .context("missing performance score")?
        * 100.0;

    let audits = lighthouse
        .get("audits")
        .and_then(Value::as_object)
        .context("missing audits")?;

    let display_value = |audit: &str| -> Option<String> {
        audits
            .get(audit)
            .and_then(|a| a.get("displayValue"))
            .and_then(Value::as_str)
            .map(|v| v.to_string())
    };

    let mut recommendations: Vec<String> = audits
        .values()
        .filter(|audit| {
            audit
                .get("score")
                .and_then(Value::as_f64)
                .map_or(false, |s| s < 0.9)
        })
        .filter_map(|audit| audit.get("title").and_then(Value::as_str))
        .map(|t| t.to_string())
        .collect();
    recommendations.truncate(5);

    Ok(PagespeedReport {
        performance_score,
        first_contentful_paint: display_value("first-contentful-paint"),
        largest_contentful_paint: display_value("largest-contentful-paint"),
        time_to_interactive: display_value("interactive"),
        cumulative_layout_shift: display_value("cumulative-layout-shift"),
        recommendations,
    })
}
