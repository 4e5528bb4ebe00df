//! Page summarization through a `generateContent`-style HTTP API.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::services::content_extractor::{truncate_chars, MAX_CONTENT_CHARS};
use crate::types::errors::SummaryError;
use crate::types::settings::SummarizerSettings;
use crate::types::summary::{
    GenerateContent, GeneratePart, GenerateRequest, GenerateResponse, SummaryLength,
};

/// Returned when the service answers without any candidate.
pub const NO_SUMMARY_TEXT: &str = "No summary generated.";

const PROMPT_PREAMBLE: &str = "You are an expert at reading web articles and distilling their substance. \
Summarize the following web page content. Write plain prose without headings or bullet points.";

/// Trait for anything that can turn page text into a summary.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, content: &str, length: SummaryLength) -> Result<String, SummaryError>;
}

/// Summarizer backed by the Gemini REST API.
pub struct GeminiSummarizer {
    endpoint: String,
    model: String,
    api_key: String,
    http_client: Client,
}

impl GeminiSummarizer {
    pub fn from_settings(settings: &SummarizerSettings) -> Result<Self, SummaryError> {
        let api_key = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(SummaryError::MissingApiKey)?;

        Ok(Self {
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.trim_start_matches("models/").to_string(),
            api_key: api_key.to_string(),
            http_client: Client::new(),
        })
    }

    /// Request URL without the key query parameter.
    pub fn request_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

/// Builds the prompt sent for `content`, truncated to the content limit.
pub fn build_prompt(content: &str, length: SummaryLength) -> String {
    format!(
        "{}\n{}\n\nContent:\n{}",
        PROMPT_PREAMBLE,
        length.instruction(),
        truncate_chars(content, MAX_CONTENT_CHARS)
    )
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, content: &str, length: SummaryLength) -> Result<String, SummaryError> {
        let body = GenerateRequest {
            contents: vec![GenerateContent {
                parts: vec![GeneratePart {
                    text: build_prompt(content, length),
                }],
            }],
        };

        let response = self
            .http_client
            .post(self.request_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| SummaryError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummaryError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| SummaryError::MalformedResponse(e.to_string()))?;

        let Some(candidate) = parsed.candidates.into_iter().next() else {
            debug!(model = %self.model, "summarizer returned no candidates");
            return Ok(NO_SUMMARY_TEXT.to_string());
        };

        candidate
            .content
            .and_then(|c| c.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| SummaryError::MalformedResponse("candidate has no text part".to_string()))
    }
}
