use crate::config::{SummarizerBackend, SummarizerConfig};
use crate::types::{AggregatorError, Result};
use crate::utils::text;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Target length of a summary, in the backend's own units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryBounds {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for SummaryBounds {
    fn default() -> Self {
        Self {
            min_length: 30,
            max_length: 130,
        }
    }
}

/// Trait for text-summarization backends
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Get the name of this backend
    fn name(&self) -> String;

    /// Summarize `text` within `bounds`
    async fn summarize(&self, text: &str, bounds: SummaryBounds) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    min_length: usize,
    max_length: usize,
    do_sample: bool,
}

#[derive(Debug, Deserialize)]
struct InferenceOutput {
    summary_text: String,
}

/// Hosted summarization model behind a Hugging Face style inference endpoint.
pub struct HttpSummarizer {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpSummarizer {
    pub fn new(endpoint: String, api_token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_token,
        })
    }
}

#[async_trait]
impl Summarizer for HttpSummarizer {
    fn name(&self) -> String {
        format!("http ({})", self.endpoint)
    }

    async fn summarize(&self, text: &str, bounds: SummaryBounds) -> Result<String> {
        let payload = InferenceRequest {
            inputs: text,
            parameters: InferenceParameters {
                min_length: bounds.min_length,
                max_length: bounds.max_length,
                do_sample: false,
            },
        };

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AggregatorError::Summarization(format!(
                "HTTP {}: {}",
                status,
                text::truncate_chars(detail.trim(), 200)
            )));
        }

        let body = response.text().await?;
        let outputs: Vec<InferenceOutput> = serde_json::from_str(&body).inspect_err(|e| {
            debug!(
                "Unreadable summarizer response ({}): {}",
                e,
                text::truncate_chars(body.trim(), 200)
            )
        })?;

        outputs
            .into_iter()
            .next()
            .map(|o| o.summary_text.trim().to_string())
            .ok_or_else(|| AggregatorError::Summarization("Empty response array".to_string()))
    }
}

/// Extractive backend: leading sentences of the article, bounded in words.
///
/// Needs no network and always produces the same output for the same input.
pub struct LeadSentenceSummarizer;

#[async_trait]
impl Summarizer for LeadSentenceSummarizer {
    fn name(&self) -> String {
        "lead-sentences".to_string()
    }

    async fn summarize(&self, input: &str, bounds: SummaryBounds) -> Result<String> {
        let mut words: Vec<&str> = Vec::new();
        for sentence in text::split_sentences(input) {
            if words.len() >= bounds.min_length {
                break;
            }
            words.extend(sentence.split_whitespace());
        }

        if words.is_empty() {
            return Err(AggregatorError::Summarization("No text to summarize".to_string()));
        }

        words.truncate(bounds.max_length);
        Ok(words.join(" "))
    }
}

/// Result of one adapter call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOutcome {
    pub summary: String,
    pub fell_back: bool,
}

/// Wraps a backend so that summarization can never fail.
///
/// Input is cut to `max_input_chars` before the call; any error, timeout or
/// empty output yields the fallback text instead.
pub struct SummarizerAdapter {
    inner: Box<dyn Summarizer>,
    bounds: SummaryBounds,
    max_input_chars: usize,
    timeout: Duration,
    fallback: String,
}

impl SummarizerAdapter {
    pub fn new(inner: Box<dyn Summarizer>, config: &SummarizerConfig) -> Self {
        Self {
            inner,
            bounds: SummaryBounds {
                min_length: config.min_length,
                max_length: config.max_length,
            },
            max_input_chars: config.max_input_chars,
            timeout: Duration::from_secs(config.timeout_seconds),
            fallback: config.fallback.clone(),
        }
    }

    /// Build the backend named in the config.
    pub fn from_config(config: &SummarizerConfig) -> Result<Self> {
        let inner: Box<dyn Summarizer> = match config.backend {
            SummarizerBackend::Http => Box::new(HttpSummarizer::new(
                config.endpoint.clone(),
                config.api_token.clone(),
                Duration::from_secs(config.timeout_seconds),
            )?),
            SummarizerBackend::Lead => Box::new(LeadSentenceSummarizer),
        };
        info!("Using summarizer backend: {}", inner.name());
        Ok(Self::new(inner, config))
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub async fn summarize(&self, input: &str) -> SummaryOutcome {
        let input = text::truncate_chars(input.trim(), self.max_input_chars);
        if input.is_empty() {
            debug!("Empty input, using fallback summary");
            return self.fall_back();
        }

        match tokio::time::timeout(self.timeout, self.inner.summarize(input, self.bounds)).await {
            Ok(Ok(summary)) if !summary.trim().is_empty() => SummaryOutcome {
                summary: summary.trim().to_string(),
                fell_back: false,
            },
            Ok(Ok(_)) => {
                warn!("Summarizer {} returned an empty summary", self.inner.name());
                self.fall_back()
            }
            Ok(Err(e)) => {
                warn!("Summarizer {} failed ({}): {}", self.inner.name(), e.kind(), e);
                self.fall_back()
            }
            Err(_) => {
                warn!("Summarizer {} timed out after {:?}", self.inner.name(), self.timeout);
                self.fall_back()
            }
        }
    }

    fn fall_back(&self) -> SummaryOutcome {
        SummaryOutcome {
            summary: self.fallback.clone(),
            fell_back: true,
        }
    }
}
