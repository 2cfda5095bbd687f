use async_openai::{
    config::OpenAIConfig,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};

use crate::domain::page::ExtractedPage;
use crate::errors::AnalysisError;

const MAX_CONTENT_CHARS: usize = 4000;

#[derive(Debug, Clone)]
pub struct GeneratedDescription {
    pub description: String,
    /// How much usable page content backed the generation, in [0, 1].
    pub confidence: f64,
}

/// Wraps the text-generation collaborator. Generation is best-effort: a
/// missing key or API failure degrades the description, never the job.
#[derive(Clone)]
pub struct DescriptionGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    enabled: bool,
}

impl DescriptionGenerator {
    pub fn new(api_key: String, model: String) -> Self {
        let enabled = !api_key.is_empty();
        let config = OpenAIConfig::new().with_api_key(api_key);
        DescriptionGenerator {
            client: Client::with_config(config),
            model,
            enabled,
        }
    }

    pub async fn generate(&self, page: &ExtractedPage) -> Result<GeneratedDescription, AnalysisError> {
        if !self.enabled {
            return Err(AnalysisError::ExternalService(
                "Description generation is not configured".to_string(),
            ));
        }

        let confidence = content_confidence(page);
        if confidence == 0.0 {
            return Err(AnalysisError::ExternalService(
                "Not enough page content to generate a description".to_string(),
            ));
        }

        let prompt = build_prompt(page);
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| AnalysisError::ExternalService(e.to_string()))?
                .into()])
            .max_tokens(200_u32)
            .build()
            .map_err(|e| AnalysisError::ExternalService(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AnalysisError::ExternalService(format!("Generation failed: {}", e)))?;

        let description = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                AnalysisError::ExternalService("Empty response from generation model".to_string())
            })?;

        Ok(GeneratedDescription {
            description,
            confidence,
        })
    }
}

fn build_prompt(page: &ExtractedPage) -> String {
    let mut content = page.main_text.clone();
    if content.chars().count() > MAX_CONTENT_CHARS {
        content = content.chars().take(MAX_CONTENT_CHARS).collect();
    }

    format!(
        "Write a concise, engaging description (2-3 sentences) of the website below, \
         suitable as a meta description. Respond with the description only.\n\
         Title: {}\n\
         Current description: {}\n\
         Page content: {}",
        page.title.as_deref().unwrap_or("(none)"),
        page.meta_description.as_deref().unwrap_or("(none)"),
        content
    )
}

/// Confidence reflects the evidence available to the model: a title, an
/// existing description, and a reasonable amount of body text.
fn content_confidence(page: &ExtractedPage) -> f64 {
    let word_count = page.main_text.split_whitespace().count();
    if word_count < 10 {
        return 0.0;
    }

    let mut confidence: f64 = 0.35;
    if page.title.is_some() {
        confidence += 0.2;
    }
    if page.meta_description.is_some() {
        confidence += 0.15;
    }
    confidence += 0.3 * (word_count.min(600) as f64 / 600.0);
    confidence.min(1.0)
}
