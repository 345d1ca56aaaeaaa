//! Background enrichment worker.
//!
//! Finds content items missing an artifact, generates images for them
//! under hourly/daily rate caps, and optionally refreshes topic tags.
//! Designed to run from cron, e.g. hourly:
//!
//! ```text
//! 0 * * * * cd /srv/newsdesk && ./enrich-worker --limit 5
//! ```
//!
//! Environment:
//!   WP_API_BASE, WP_USER, WP_APP_PASSWORD  — content store (required)
//!   OPENCLAW_URL, OPENCLAW_API_KEY         — openclaw provider
//!   OPENAI_API_KEY                         — hosted image provider
//!   COMFYUI_URL, A1111_URL                 — local providers
//!   LOCAL_LLM_BASE_URL, LOCAL_LLM_MODEL    — tag-extraction completions
//!   ENRICH_HOURLY_CAP, ENRICH_DAILY_CAP    — rate caps (default 8 / 180)

mod usage;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use enrichment::llm::OpenAiCompat;
use enrichment::stores::WordPressStore;
use enrichment::{
    ArtifactKind, ContentStore, EnrichConfig, Enricher, GenerateOptions, SecretString,
};

use crate::usage::UsageLog;

#[derive(Parser, Debug)]
#[command(name = "enrich-worker", about = "Generate images and tags for content items")]
struct Args {
    /// Maximum items to process this run
    #[arg(long, default_value_t = 5)]
    limit: usize,

    /// Provider to generate with
    #[arg(long, default_value = "openclaw")]
    provider: String,

    /// Artifact kind to fill (featured or og)
    #[arg(long, default_value = "featured")]
    kind: ArtifactKind,

    /// Also refresh topic tags for each processed item
    #[arg(long)]
    tags: bool,

    /// Regenerate even when an item is already marked generated
    #[arg(long)]
    overwrite: bool,

    /// Usage log file for rate capping
    #[arg(long, default_value = ".enrich_usage.json")]
    usage_file: String,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn build_config() -> EnrichConfig {
    let mut config = EnrichConfig::default();
    config.remote_job.endpoint = env_or("OPENCLAW_URL", &config.remote_job.endpoint);
    config.remote_job.api_key = SecretString::from_env("OPENCLAW_API_KEY");
    config.direct_image.api_key = SecretString::from_env("OPENAI_API_KEY");
    config.async_queue.endpoint = env_or("COMFYUI_URL", &config.async_queue.endpoint);
    config.local_synth.endpoint = env_or("A1111_URL", &config.local_synth.endpoint);
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let api_base = std::env::var("WP_API_BASE").context("WP_API_BASE not set")?;
    let user = std::env::var("WP_USER").context("WP_USER not set")?;
    let password = std::env::var("WP_APP_PASSWORD").context("WP_APP_PASSWORD not set")?;

    let hourly_cap: usize = env_or("ENRICH_HOURLY_CAP", "8").parse()?;
    let daily_cap: usize = env_or("ENRICH_DAILY_CAP", "180").parse()?;
    let mut usage = UsageLog::load(&args.usage_file, hourly_cap, daily_cap);

    let store = WordPressStore::new(api_base, user, password);
    let llm = OpenAiCompat::new(
        env_or("LOCAL_LLM_BASE_URL", "http://172.17.0.1:1240"),
        env_or("LOCAL_LLM_MODEL", "Mistral-7B-Instruct-v0.3-Q4_K_M.gguf"),
    );
    let enricher = Enricher::new(store, llm, build_config());

    info!(
        provider = %args.provider,
        kind = %args.kind,
        limit = args.limit,
        hourly_cap,
        daily_cap,
        "enrichment worker starting"
    );

    let stats = enricher.stats().await?;
    info!(
        missing_featured = stats.missing_featured,
        missing_og = stats.missing_og,
        "current backlog"
    );

    let ids = enricher
        .store()
        .items_missing(args.kind, args.limit)
        .await?;

    let mut generated = 0usize;
    let mut pending = 0usize;
    let mut failed = 0usize;
    let mut tagged = 0usize;

    for id in ids {
        if !usage.can_generate() {
            warn!("rate cap reached, stopping this run");
            break;
        }

        let options = GenerateOptions {
            overwrite: args.overwrite,
        };
        match enricher.generate(id, args.kind, &args.provider, options).await {
            Ok(outcome) if outcome.skipped => {
                info!(item_id = id, "already generated, skipped");
            }
            Ok(outcome) if outcome.pending_job.is_some() => {
                pending += 1;
                usage.record()?;
                info!(item_id = id, job = outcome.pending_job.as_deref(), "queued");
            }
            Ok(_) => {
                generated += 1;
                usage.record()?;
                info!(item_id = id, "generated");
            }
            Err(e) => {
                failed += 1;
                warn!(item_id = id, error = %e, kind = e.kind(), "generation failed");
            }
        }

        if args.tags {
            match enricher.analyze_tags(id).await {
                Ok(tags) => {
                    tagged += 1;
                    info!(item_id = id, tag_count = tags.len(), "tags merged");
                }
                Err(e) => warn!(item_id = id, error = %e, "tag analysis failed"),
            }
        }
    }

    info!(generated, pending, failed, tagged, "run complete");
    Ok(())
}
