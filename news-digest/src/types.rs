use serde::{Deserialize, Serialize};
// Use the interfaces crate for core types
pub use interfaces::defs::{ArticleRecord, CandidateEntry, FeedItem, FeedSource, STORE_COLUMNS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_body_size_mb: usize,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (compatible; news-digest/0.1)".to_string(),
            timeout_seconds: 10,
            max_body_size_mb: 10,
            max_redirects: 5,
        }
    }
}

/// Coarse failure classes used for logging and run accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Network,
    Parse,
    Summarization,
    Storage,
    Config,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailureKind::Network => "network",
            FailureKind::Parse => "parse",
            FailureKind::Summarization => "summarization",
            FailureKind::Storage => "storage",
            FailureKind::Config => "config",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Response from {url} exceeds limit: {size_mb}MB")]
    ResponseTooLarge { url: String, size_mb: usize },

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Summarization failed: {0}")]
    Summarization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("{path} has columns {found:?}, not the record store layout")]
    IncompatibleStore { path: String, found: Vec<String> },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AggregatorError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AggregatorError::Http(_)
            | AggregatorError::Status { .. }
            | AggregatorError::ResponseTooLarge { .. } => FailureKind::Network,
            AggregatorError::Parse(_)
            | AggregatorError::InvalidUrl(_)
            | AggregatorError::Serialization(_) => FailureKind::Parse,
            AggregatorError::Summarization(_) => FailureKind::Summarization,
            AggregatorError::Io(_)
            | AggregatorError::Csv(_)
            | AggregatorError::InvalidRecord(_)
            | AggregatorError::IncompatibleStore { .. } => FailureKind::Storage,
            AggregatorError::ConfigFile(_) | AggregatorError::Config(_) => FailureKind::Config,
        }
    }
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
