use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ai_client::openai::OpenAi;
use browseruse_client::BrowserUseClient;
use gapscope_analysis::{analyze_gaps, fallback_topics, DashboardWriter, TopicExtractor};
use gapscope_common::{CompanyRoster, CompanyTopics, Config};
use gapscope_scout::agent::BrowserAgent;
use gapscope_scout::embedder::Embedder;
use gapscope_scout::ingest::Ingestor;
use gapscope_scout::store::MilvusDocumentStore;
use gapscope_scout::traits::DocumentStore;
use milvus_client::MilvusClient;

/// Documents older than this are left out of topic analysis.
const ANALYSIS_WINDOW_DAYS: i64 = 90;

/// Gemini's OpenAI-compatible endpoint.
const GEMINI_OPENAI_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

#[derive(Parser)]
#[command(name = "gapscope", about = "Competitor blog ingestion and content-gap analysis")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape every company in the roster and persist new blogs.
    /// Invoked by an external scheduler; owns no cadence of its own.
    Ingest {
        /// Path to the TOML company roster.
        #[arg(long, default_value = "companies.toml")]
        companies: PathBuf,
    },
    /// Extract per-company topics from stored documents and write gap
    /// analysis dashboard artifacts.
    Analyze {
        /// Reference company name; defaults to REFERENCE_COMPANY.
        #[arg(long)]
        reference: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("gapscope=info".parse()?))
        .init();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    config.log_summary();

    match cli.command {
        Command::Ingest { companies } => ingest(&config, &companies).await,
        Command::Analyze { reference } => analyze(&config, reference).await,
    }
}

fn document_store(config: &Config) -> MilvusDocumentStore {
    let milvus = MilvusClient::new(&config.zilliz_uri, &config.zilliz_token);
    MilvusDocumentStore::new(milvus, &config.collection_name, config.dedup_failure_policy)
}

async fn ingest(config: &Config, companies: &PathBuf) -> Result<()> {
    let roster = CompanyRoster::load(companies)?;
    info!(companies = roster.len(), "Company roster loaded");

    let agent = BrowserAgent::new(
        BrowserUseClient::new(&config.browser_use_api_key),
        config.agent_max_steps,
    );
    let embedder = Embedder::new(&config.hf_token, &config.embedding_model);

    let ingestor = Ingestor::new(
        Arc::new(agent),
        Arc::new(document_store(config)),
        Arc::new(embedder),
    );

    let report = ingestor.ingest_all(&roster).await;
    println!("{report}");
    Ok(())
}

async fn analyze(config: &Config, reference: Option<String>) -> Result<()> {
    let reference_company = reference.unwrap_or_else(|| config.reference_company.clone());

    let store = document_store(config);
    let since = chrono::Utc::now() - chrono::Duration::days(ANALYSIS_WINDOW_DAYS);
    let texts = store.fetch_company_texts(since).await?;
    info!(companies = texts.len(), window_days = ANALYSIS_WINDOW_DAYS, "Documents aggregated");

    let chat = OpenAi::new(&config.google_api_key, &config.chat_model)
        .with_base_url(GEMINI_OPENAI_URL);
    let extractor = TopicExtractor::new(chat);
    let company_topics = extractor.topics_for_all(&texts).await;

    let reference_topics = match company_topics
        .iter()
        .find(|c| c.company.eq_ignore_ascii_case(&reference_company))
    {
        Some(found) => found.clone(),
        None => {
            warn!(
                company = %reference_company,
                "No stored documents for reference company, using fallback topics"
            );
            CompanyTopics {
                company: reference_company.clone(),
                topics: fallback_topics(&reference_company),
            }
        }
    };

    let competitors: Vec<&CompanyTopics> = company_topics
        .iter()
        .filter(|c| !c.company.eq_ignore_ascii_case(&reference_company))
        .collect();

    let analysis = analyze_gaps(&reference_topics, &competitors);
    info!(
        gaps = analysis.gaps.len(),
        coverage_percentage = analysis.coverage_percentage,
        "Gap analysis complete"
    );

    let writer = DashboardWriter::new(&config.dashboards_dir);
    let folder = writer.write(&analysis, &company_topics)?;
    println!("Dashboard written to {}", folder.display());

    Ok(())
}
