pub mod types;
pub mod traits;
pub mod config;
pub mod fetcher;
pub mod parser;
pub mod relevance;
pub mod extractor;
pub mod llm_adapter;
pub mod dedup;
pub mod store;
pub mod aggregator;
pub mod pipeline;
pub mod utils;

pub use types::*;
pub use traits::ContentFetch;
pub use config::{PipelineConfig, SummarizerBackend, SummarizerConfig};
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use relevance::{is_relevant, KeywordSet};
pub use extractor::{ContentExtractor, Extraction};
pub use llm_adapter::{HttpSummarizer, LeadSentenceSummarizer, Summarizer, SummarizerAdapter, SummaryBounds};
pub use dedup::{similarity_ratio, DedupEngine};
pub use store::RecordStore;
pub use aggregator::{CandidateBatch, RssAggregator};
pub use pipeline::{Pipeline, RunOutcome, RunReport};
