use anyhow::Context;
use clap::{Parser, Subcommand};
use news_digest::{ArticleRecord, Pipeline, PipelineConfig, RecordStore, RunOutcome, SummarizerBackend};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "news-digest", version, about = "Fetch, summarize and de-duplicate news from RSS feeds")]
struct Cli {
    /// TOML configuration file; built-in sites and keywords are used otherwise
    #[arg(long, global = true, env = "NEWS_DIGEST_CONFIG")]
    config: Option<PathBuf>,

    /// Record store (CSV) to read and append to
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one full pass: fetch feeds, summarize new articles, append them to the store
    Fetch {
        /// Use the built-in extractive summarizer instead of the hosted model
        #[arg(long)]
        offline: bool,

        /// Summarization endpoint (Hugging Face inference API format)
        #[arg(long, env = "SUMMARIZER_ENDPOINT")]
        summarizer_endpoint: Option<String>,

        /// Bearer token for the summarization endpoint
        #[arg(long, env = "HF_API_TOKEN", hide_env_values = true)]
        api_token: Option<String>,
    },
    /// Print the stored articles
    Show {
        /// Only the most recent N records
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(store) = cli.store {
        config.store_path = store;
    }

    match cli.command {
        Command::Fetch {
            offline,
            summarizer_endpoint,
            api_token,
        } => {
            if offline {
                config.summarizer.backend = SummarizerBackend::Lead;
            }
            if let Some(endpoint) = summarizer_endpoint {
                config.summarizer.endpoint = endpoint;
            }
            if api_token.is_some() {
                config.summarizer.api_token = api_token;
            }
            fetch(config).await
        }
        Command::Show { limit } => show(&config, limit),
    }
}

async fn fetch(config: PipelineConfig) -> anyhow::Result<()> {
    info!("Starting news digest pass");

    let pipeline = Pipeline::from_config(config).context("Failed to set up pipeline")?;
    let report = pipeline
        .run()
        .await
        .with_context(|| format!("Pass failed for store {}", pipeline.store().path().display()))?;

    match report.outcome() {
        RunOutcome::Appended(_) => {
            for record in &report.records {
                print_record(record);
            }
        }
        outcome => warn!("{}", outcome),
    }
    println!("{}", report.outcome());

    if report.feeds_failed > 0 {
        info!("{}/{} feeds could not be read", report.feeds_failed, report.feeds_attempted);
    }
    Ok(())
}

fn show(config: &PipelineConfig, limit: Option<usize>) -> anyhow::Result<()> {
    let store = RecordStore::new(config.store_path.clone());
    let records = store
        .load_all()
        .with_context(|| format!("Failed to read {}", store.path().display()))?;

    if records.is_empty() {
        println!("No stored articles in {}.", store.path().display());
        return Ok(());
    }

    let skip = limit.map_or(0, |n| records.len().saturating_sub(n));
    for record in &records[skip..] {
        print_record(record);
    }
    println!("{} of {} stored articles shown.", records.len() - skip, records.len());
    Ok(())
}

fn print_record(record: &ArticleRecord) {
    println!("[{}] {}", record.source, record.title);
    println!("    {}  {}", record.published.format("%Y-%m-%d %H:%M UTC"), record.link);
    println!("    {}", record.summary);
    println!();
}
