mod config;
mod digest;
mod error;
mod judge;
mod model;
mod parser;
mod pipeline;
mod prompt;
mod rate_limit;
mod source;

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use curator_common::openai::OpenAiClient;

use config::Config;
use digest::{render_report, DigestRenderer, JsonDigest, TextDigest};
use judge::LlmJudge;
use pipeline::Curator;
use source::HackerNewsSource;

/// LLM-powered Hacker News curator.
#[derive(Parser, Debug)]
#[command(name = "hn-curator", version)]
struct Cli {
    /// Fetch, judge and print today's digest, then exit.
    #[arg(long)]
    cli_digest: bool,

    /// Print the digest as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Number of top stories to fetch.
    #[arg(long, value_name = "N")]
    max_items: Option<usize>,

    /// Minimum Hacker News score before an item is sent to the judge.
    #[arg(long, value_name = "SCORE")]
    min_score: Option<i64>,

    /// Minimum relevance score (1-10) for the digest.
    #[arg(long, value_name = "SCORE")]
    min_relevance: Option<i64>,

    /// Judge calls in flight at once.
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(n) = self.max_items {
            config.max_items_fetched = n;
        }
        if let Some(n) = self.min_score {
            config.min_popularity = n;
        }
        if let Some(n) = self.min_relevance {
            config.min_relevance = n;
        }
        if let Some(n) = self.concurrency {
            config.judge_concurrency = n;
        }
    }
}

/// `RUST_LOG` when set and valid, INFO otherwise.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout is reserved for the digest
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            error!(error = %e, "failed to load .env file");
        }
    }

    let cli = Cli::parse();
    if !cli.cli_digest {
        error!("invalid arguments: nothing to do without --cli-digest");
        anyhow::bail!("no action requested, pass --cli-digest");
    }

    let mut config = Config::from_env()?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    info!(
        model = %config.model,
        llm_base_url = %config.llm.base_url,
        max_items = config.max_items_fetched,
        min_score = config.min_popularity,
        min_relevance = config.min_relevance,
        concurrency = config.judge_concurrency,
        timeout_ms = config.llm.default_timeout.as_millis(),
        max_retries = config.llm.max_retries,
        "configuration loaded"
    );

    let client = Arc::new(OpenAiClient::new(config.llm.clone())?);
    let judge = LlmJudge::new(client, &config);
    let source = HackerNewsSource::new(&config.hn_api_base)?;

    info!(started_at = %chrono::Local::now().to_rfc2822(), "fetching CLI digest");
    let report = Curator::new(&config, &judge).run(&source).await;

    let renderer: Box<dyn DigestRenderer> = if cli.json {
        Box::new(JsonDigest)
    } else {
        Box::new(TextDigest)
    };
    let mut stdout = std::io::stdout().lock();
    render_report(renderer.as_ref(), &report, &mut stdout)?;

    if report.source_unavailable {
        warn!("no stories could be fetched, this run produced no digest");
    } else if report.digest.is_empty() {
        info!(fetched = report.fetched, "nothing relevant today");
    }
    info!(finished_at = %chrono::Local::now().to_rfc2822(), "CLI digest job finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_log_level_is_honored() {
        assert_eq!(log_filter(Some("debug")).to_string(), "debug");
        assert_eq!(
            log_filter(Some("hn_curator=trace")).to_string(),
            "hn_curator=trace"
        );
    }

    #[test]
    fn defaults_to_info() {
        assert_eq!(log_filter(None).to_string(), "info");
        assert_eq!(log_filter(Some("  ")).to_string(), "info");
    }

    #[test]
    fn cli_overrides_config() {
        let cli = Cli::parse_from([
            "hn-curator",
            "--cli-digest",
            "--min-score",
            "3",
            "--min-relevance",
            "9",
            "--max-items",
            "7",
            "--concurrency",
            "2",
        ]);
        let mut config = config::test_config();
        cli.apply_overrides(&mut config);
        assert!(cli.cli_digest);
        assert_eq!(config.min_popularity, 3);
        assert_eq!(config.min_relevance, 9);
        assert_eq!(config.max_items_fetched, 7);
        assert_eq!(config.judge_concurrency, 2);
    }
}
