use crate::dedup::DEFAULT_SIMILARITY_THRESHOLD;
use crate::relevance::KeywordSet;
use crate::types::{AggregatorError, FeedSource, FetchConfig, Result};
use crate::utils::url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_STORE_PATH: &str = "News.csv";
pub const DEFAULT_SUMMARIZER_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/sshleifer/distilbart-cnn-12-6";
pub const FALLBACK_SUMMARY: &str = "Summary not available.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarizerBackend {
    /// Hosted model over HTTP
    #[default]
    Http,
    /// Offline extractive summaries
    Lead,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub backend: SummarizerBackend,
    pub endpoint: String,
    /// Bearer token for the endpoint; normally supplied via `HF_API_TOKEN`.
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    pub timeout_seconds: u64,
    pub min_length: usize,
    pub max_length: usize,
    pub max_input_chars: usize,
    pub fallback: String,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            backend: SummarizerBackend::Http,
            endpoint: DEFAULT_SUMMARIZER_ENDPOINT.to_string(),
            api_token: None,
            timeout_seconds: 60,
            min_length: 30,
            max_length: 130,
            max_input_chars: 1024,
            fallback: FALLBACK_SUMMARY.to_string(),
        }
    }
}

/// Everything one pipeline pass needs to know. Built once, then read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub keywords: Vec<String>,
    pub sites: Vec<FeedSource>,
    pub store_path: PathBuf,
    pub max_entries_per_feed: usize,
    pub max_article_chars: usize,
    pub min_word_count: usize,
    pub similarity_threshold: f64,
    pub fetch: FetchConfig,
    pub summarizer: SummarizerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let keywords = [
            "oil", "energy", "Nigeria", "inflation", "Russia", "war", "OPEC", "gas", "election", "politics",
        ];
        let sites = [
            ("BBC", "http://feeds.bbci.co.uk/news/rss.xml"),
            ("CNN", "http://rss.cnn.com/rss/edition.rss"),
            ("Al Jazeera", "https://www.aljazeera.com/xml/rss/all.xml"),
            ("Guardian Nigeria", "https://guardian.ng/feed/"),
            ("Punch", "https://punchng.com/feed/"),
        ];

        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            sites: sites.iter().map(|(name, url)| FeedSource::new(*name, *url)).collect(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            max_entries_per_feed: 5,
            max_article_chars: 2000,
            min_word_count: 100,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            fetch: FetchConfig::default(),
            summarizer: SummarizerConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a TOML document; fields left out keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: PipelineConfig = toml::from_str(content)?;
        config.fill_site_names();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn keyword_set(&self) -> KeywordSet {
        KeywordSet::new(&self.keywords)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sites.is_empty() {
            return Err(AggregatorError::Config("At least one site is required".to_string()));
        }
        for site in &self.sites {
            if !url::is_valid_feed_url(&site.url) {
                return Err(AggregatorError::Config(format!(
                    "Invalid feed URL for {}: {}",
                    site.name, site.url
                )));
            }
        }
        if self.keyword_set().is_empty() {
            return Err(AggregatorError::Config("At least one non-empty keyword is required".to_string()));
        }
        if !(self.similarity_threshold > 0.0 && self.similarity_threshold <= 1.0) {
            return Err(AggregatorError::Config(format!(
                "similarity_threshold must be in (0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if self.max_entries_per_feed == 0 {
            return Err(AggregatorError::Config("max_entries_per_feed must be positive".to_string()));
        }
        let summarizer = &self.summarizer;
        if summarizer.min_length > summarizer.max_length {
            return Err(AggregatorError::Config(format!(
                "summarizer min_length {} exceeds max_length {}",
                summarizer.min_length, summarizer.max_length
            )));
        }
        if summarizer.fallback.trim().is_empty() {
            return Err(AggregatorError::Config("summarizer fallback must not be empty".to_string()));
        }
        Ok(())
    }

    fn fill_site_names(&mut self) {
        for site in &mut self.sites {
            if site.name.trim().is_empty() {
                if let Some(domain) = url::extract_domain(&site.url) {
                    debug!("Naming unnamed site after its domain: {}", domain);
                    site.name = domain;
                }
            }
        }
    }
}
