use crate::traits::ContentFetch;
use crate::types::{AggregatorError, FetchConfig, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        // Reject garbage links before they reach the client
        Url::parse(url)?;

        let start_time = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(AggregatorError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(content_length) = response.content_length() {
            let size_mb = content_length as usize / (1024 * 1024);
            if size_mb > self.config.max_body_size_mb {
                return Err(AggregatorError::ResponseTooLarge {
                    url: url.to_string(),
                    size_mb,
                });
            }
        }

        let content = response.text().await?;
        // Chunked responses carry no Content-Length
        let size_mb = content.len() / (1024 * 1024);
        if size_mb > self.config.max_body_size_mb {
            return Err(AggregatorError::ResponseTooLarge {
                url: url.to_string(),
                size_mb,
            });
        }

        debug!(
            "Fetched {} ({} bytes in {}ms)",
            url,
            content.len(),
            start_time.elapsed().as_millis()
        );
        Ok(content)
    }
}

#[async_trait]
impl ContentFetch for Fetcher {
    async fn fetch_feed(&self, url: &str) -> Result<String> {
        debug!("Fetching feed: {}", url);
        let content = self.get_text(url).await?;
        info!("Successfully fetched feed: {} ({} bytes)", url, content.len());
        Ok(content)
    }

    async fn fetch_article(&self, url: &str) -> Result<String> {
        debug!("Fetching full content from: {}", url);
        self.get_text(url).await
    }
}
