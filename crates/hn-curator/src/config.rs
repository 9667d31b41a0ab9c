use std::time::Duration;

use curator_common::error::{lookup_parse, lookup_str, process_env, Lookup};
use curator_common::openai::OpenAiClientConfig;

use crate::error::AppError;

pub const DEFAULT_HN_API_BASE: &str = "https://hacker-news.firebaseio.com/v0";
pub const DEFAULT_MODEL: &str = "gemma-3-4b-it";

/// Interest profile used when neither `INTEREST_PROFILE` nor `INTEREST_PROFILE_FILE` is set.
pub const DEFAULT_INTEREST_PROFILE: &str = "\
The user is a software engineer highly interested in:
- Programming languages such as Rust, Go, and advanced Python topics.
- Systems engineering, which should be scored well.
- WebAssembly and virtualisation technologies.
- Cybersecurity: system vulnerabilities, new attack vectors, and defensive strategies.
- Web design and quirky websites or articles.
- Hacky, cool and interesting articles, and open source projects.
- Commentary on culture or politics.
- Compilers and programming language design.
- AI and machine learning, especially LLMs and their practical applications.
Beyond purely technical topics, the user has a strong preference for:
- Personal narratives: honest, first-hand accounts of building projects and learning from them.
- Authentic struggles: authors candidly discussing difficulties, frustrations or failures.
- Lessons learned from imperfect creations, in the spirit of \"my site is ugly because I made it\".
- Obscure and unique components: salvaged, surplus, industrial or repurposed hardware and instruments.
- Hands-on tinkering with unconventional materials or unexpected combinations of parts.
- The joy of discovery: the surprising history or utility of obscure technical artifacts.
- Resourcefulness, ingenuity, and eccentric niche interests.
";

/// Application configuration, built once at startup and passed by reference.
///
/// The judge credential is required: without it no item is ever judged, so loading
/// fails before any work starts.
#[derive(Debug, Clone)]
pub struct Config {
    /// Items below this source score never reach the judge.
    pub min_popularity: i64,
    /// Judged items below this relevance score are dropped (1-10).
    pub min_relevance: i64,
    /// Description of the reader's interests, embedded verbatim in every judge prompt.
    pub interest_profile: String,
    /// How many top stories to fetch per run.
    pub max_items_fetched: usize,
    /// Base URL of the Hacker News API.
    pub hn_api_base: String,
    /// Model id sent to the chat completion endpoint.
    pub model: String,
    /// Judge transport: endpoint, credential, timeout, retry policy.
    pub llm: OpenAiClientConfig,
    /// Pause after a failed judgment before moving on.
    pub judge_failure_delay: Duration,
    /// Maximum judge requests per second. `None` disables pacing.
    pub judge_rate_limit_rps: Option<u32>,
    /// Number of judge calls in flight at once; 1 is strictly sequential.
    pub judge_concurrency: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `GOOGLE_API_KEY` (or `LLM_API_KEY`): judge credential
    ///
    /// Optional:
    /// - `HN_MIN_SCORE`, `MIN_RELEVANCE_SCORE`, `HN_MAX_ITEMS`, `HN_API_BASE`
    /// - `INTEREST_PROFILE` or `INTEREST_PROFILE_FILE`
    /// - `LLM_MODEL`, `LLM_BASE_URL`, `LLM_TIMEOUT_SECS`, `LLM_MAX_RETRIES`,
    ///   `LLM_RETRY_INITIAL_MS`, `LLM_RETRY_MAX_MS`, `LLM_MAX_ERROR_BODY_BYTES`
    /// - `JUDGE_FAILURE_DELAY_MS`, `JUDGE_RATE_LIMIT_RPS`, `JUDGE_CONCURRENCY`
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(&process_env)
    }

    /// Build the configuration from any variable source; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self, AppError> {
        let llm = OpenAiClientConfig::from_lookup(lookup)?;
        if llm.api_key.is_none() {
            return Err(AppError::Config(
                "GOOGLE_API_KEY (or LLM_API_KEY) environment variable is required".to_string(),
            ));
        }

        let interest_profile = match lookup_str(lookup, "INTEREST_PROFILE") {
            Some(profile) => profile,
            None => match lookup_str(lookup, "INTEREST_PROFILE_FILE") {
                Some(path) => std::fs::read_to_string(&path).map_err(|e| {
                    AppError::Config(format!("failed to read INTEREST_PROFILE_FILE {path}: {e}"))
                })?,
                None => DEFAULT_INTEREST_PROFILE.to_string(),
            },
        };

        let config = Self {
            min_popularity: lookup_parse(lookup, "HN_MIN_SCORE")?.unwrap_or(10),
            min_relevance: lookup_parse(lookup, "MIN_RELEVANCE_SCORE")?.unwrap_or(8),
            interest_profile,
            max_items_fetched: lookup_parse(lookup, "HN_MAX_ITEMS")?.unwrap_or(30),
            hn_api_base: lookup_str(lookup, "HN_API_BASE")
                .unwrap_or_else(|| DEFAULT_HN_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: lookup_str(lookup, "LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm,
            judge_failure_delay: Duration::from_millis(
                lookup_parse(lookup, "JUDGE_FAILURE_DELAY_MS")?.unwrap_or(1_000),
            ),
            judge_rate_limit_rps: lookup_parse::<u32>(lookup, "JUDGE_RATE_LIMIT_RPS")?
                .filter(|&n| n > 0),
            judge_concurrency: lookup_parse(lookup, "JUDGE_CONCURRENCY")?.unwrap_or(1),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges. Called again after command-line overrides are applied.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(1..=10).contains(&self.min_relevance) {
            return Err(AppError::Config(format!(
                "minimum relevance must be between 1 and 10, got {}",
                self.min_relevance
            )));
        }
        if self.judge_concurrency == 0 {
            return Err(AppError::Config(
                "judge concurrency must be at least 1".to_string(),
            ));
        }
        if self.interest_profile.trim().is_empty() {
            return Err(AppError::Config("interest profile is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        min_popularity: 10,
        min_relevance: 8,
        interest_profile: "Rust, compilers, and odd hardware.".to_string(),
        max_items_fetched: 30,
        hn_api_base: DEFAULT_HN_API_BASE.to_string(),
        model: DEFAULT_MODEL.to_string(),
        llm: OpenAiClientConfig::default(),
        judge_failure_delay: Duration::ZERO,
        judge_rate_limit_rps: None,
        judge_concurrency: 1,
    }
}
