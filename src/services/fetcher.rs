use std::time::Duration;

use crate::errors::AnalysisError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Fetches the page under analysis. Follows redirects (reqwest default),
/// treats non-2xx as a fetch failure.
#[derive(Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        PageFetcher { client }
    }

    pub async fn fetch(&self, url: &str) -> Result<String, AnalysisError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AnalysisError::Fetch("Request timed out. The server is not responding.".to_string())
            } else if e.is_connect() {
                AnalysisError::Fetch(
                    "Could not connect to the server. Check the URL.".to_string(),
                )
            } else {
                AnalysisError::Fetch(format!("Error requesting URL: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = match status.as_u16() {
                404 => "Page not found (404)".to_string(),
                403 => "Access denied (403)".to_string(),
                429 => "Too many requests (429)".to_string(),
                code => format!("HTTP error {}", code),
            };
            return Err(AnalysisError::Fetch(message));
        }

        response
            .text()
            .await
            .map_err(|e| AnalysisError::Fetch(format!("Failed to read response body: {}", e)))
    }
}
