use crate::aggregator::RssAggregator;
use crate::config::PipelineConfig;
use crate::dedup::DedupEngine;
use crate::extractor::ContentExtractor;
use crate::fetcher::Fetcher;
use crate::llm_adapter::SummarizerAdapter;
use crate::parser::FeedParser;
use crate::store::RecordStore;
use crate::traits::ContentFetch;
use crate::types::{ArticleRecord, CandidateEntry, FailureKind, Result};
use crate::utils::time::format_duration;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// What the user sees after a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing survived feed filtering and extraction
    NoArticlesFound,
    /// Everything that survived was already stored
    NoNewArticles,
    Appended(usize),
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunOutcome::NoArticlesFound => f.write_str("No articles found."),
            RunOutcome::NoNewArticles => f.write_str("No new articles."),
            RunOutcome::Appended(n) => write!(f, "Fetched {} new articles.", n),
        }
    }
}

/// Counters for one pipeline pass.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub feeds_attempted: usize,
    pub feeds_failed: usize,
    pub entries_seen: usize,
    pub candidates: usize,
    pub articles_unavailable: usize,
    pub dropped_short: usize,
    pub summaries_fallback: usize,
    pub published_unknown: usize,
    pub records_built: usize,
    pub duplicates: usize,
    pub appended: usize,
    pub failures: HashMap<FailureKind, usize>,
    pub records: Vec<ArticleRecord>,
}

impl RunReport {
    fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
            elapsed: Duration::ZERO,
            feeds_attempted: 0,
            feeds_failed: 0,
            entries_seen: 0,
            candidates: 0,
            articles_unavailable: 0,
            dropped_short: 0,
            summaries_fallback: 0,
            published_unknown: 0,
            records_built: 0,
            duplicates: 0,
            appended: 0,
            failures: HashMap::new(),
            records: Vec::new(),
        }
    }

    fn record_failure(&mut self, kind: FailureKind) {
        *self.failures.entry(kind).or_insert(0) += 1;
    }

    pub fn failures_of(&self, kind: FailureKind) -> usize {
        self.failures.get(&kind).copied().unwrap_or(0)
    }

    pub fn outcome(&self) -> RunOutcome {
        if self.records_built == 0 {
            RunOutcome::NoArticlesFound
        } else if self.appended == 0 {
            RunOutcome::NoNewArticles
        } else {
            RunOutcome::Appended(self.appended)
        }
    }
}

/// One full fetch → filter → extract → summarize → dedup → store pass.
pub struct Pipeline {
    config: PipelineConfig,
    fetcher: Arc<dyn ContentFetch>,
    aggregator: RssAggregator,
    extractor: ContentExtractor,
    summarizer: SummarizerAdapter,
    dedup: DedupEngine,
    store: RecordStore,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, fetcher: Arc<dyn ContentFetch>, summarizer: SummarizerAdapter) -> Self {
        let aggregator = RssAggregator::new(
            fetcher.clone(),
            FeedParser::new(config.max_entries_per_feed),
            config.keyword_set(),
        );
        let extractor = ContentExtractor::new(config.max_article_chars, config.min_word_count);
        let dedup = DedupEngine::new(config.similarity_threshold);
        let store = RecordStore::new(config.store_path.clone());

        Self {
            config,
            fetcher,
            aggregator,
            extractor,
            summarizer,
            dedup,
            store,
        }
    }

    /// Wire up the HTTP fetcher and the configured summarizer backend.
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let fetcher: Arc<dyn ContentFetch> = Arc::new(Fetcher::new(config.fetch.clone())?);
        let summarizer = SummarizerAdapter::from_config(&config.summarizer)?;
        Ok(Self::new(config, fetcher, summarizer))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Run one pass.
    ///
    /// Per-feed and per-article problems are logged, counted and skipped. Only
    /// failing to read or write the store ends the run with an error.
    pub async fn run(&self) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id);
        self.run_inner(run_id).instrument(span).await
    }

    async fn run_inner(&self, run_id: Uuid) -> Result<RunReport> {
        let start_time = Instant::now();
        let mut report = RunReport::new(run_id);

        info!(
            "Starting pass over {} sites with {} keywords (store: {})",
            self.config.sites.len(),
            self.config.keywords.len(),
            self.store.path().display()
        );

        self.store.verify_layout()?;
        let existing_titles = self.store.load_existing_titles()?;

        let batch = self.aggregator.collect_candidates(&self.config.sites).await;
        report.feeds_attempted = batch.feeds_attempted;
        report.feeds_failed = batch.feeds_failed;
        report.entries_seen = batch.entries_seen;
        report.candidates = batch.candidates.len();
        for (_, kind) in &batch.failures {
            report.record_failure(*kind);
        }

        let mut built = Vec::with_capacity(batch.candidates.len());
        for candidate in batch.candidates {
            if let Some(record) = self.build_record(candidate, &mut report).await {
                built.push(record);
            }
        }
        report.records_built = built.len();

        let survivors = self.dedup.filter_new(built, &existing_titles);
        let survivors = self.dedup.collapse_batch(survivors);
        report.duplicates = report.records_built - survivors.len();

        report.appended = self.store.append(&survivors)?;
        report.records = survivors;
        report.elapsed = start_time.elapsed();

        info!(
            "Pass finished in {}: {} candidates, {} too short, {} duplicates, {} appended",
            format_duration(report.elapsed),
            report.candidates,
            report.dropped_short,
            report.duplicates,
            report.appended
        );
        Ok(report)
    }

    /// Fetch, extract and summarize one candidate. `None` when it does not
    /// clear the admission floor.
    async fn build_record(&self, candidate: CandidateEntry, report: &mut RunReport) -> Option<ArticleRecord> {
        let html = match self.fetcher.fetch_article(&candidate.link).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Failed to fetch article {}: {}", candidate.link, e);
                report.articles_unavailable += 1;
                report.record_failure(e.kind());
                String::new()
            }
        };

        let extraction = self.extractor.extract(&html);
        if !self.extractor.admits(&extraction) {
            debug!(
                "Dropping {:?}: {} words is below the admission floor",
                candidate.title, extraction.word_count
            );
            report.dropped_short += 1;
            return None;
        }

        if !extraction.published_known {
            debug!("No usable publish time for {}, using current time", candidate.link);
            report.published_unknown += 1;
        }

        let outcome = self.summarizer.summarize(&extraction.text).await;
        if outcome.fell_back {
            report.summaries_fallback += 1;
            report.record_failure(FailureKind::Summarization);
        }

        Some(ArticleRecord::from_candidate(candidate, extraction.published, outcome.summary))
    }
}
