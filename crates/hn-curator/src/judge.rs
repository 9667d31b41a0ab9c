/// Relevance judge backed by an OpenAI-compatible chat completion endpoint.
///
/// Every failure mode (transport, upstream error, unparseable output) ends as `None`
/// at the `RelevanceJudge` boundary; the caller never sees raw model text.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use curator_common::openai::{ChatCompletionRequest, Message, OpenAiClient};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::JudgeError;
use crate::model::Judgment;
use crate::parser::parse_judgment;
use crate::prompt::build_prompt;
use crate::rate_limit::RateLimiter;

#[async_trait]
pub trait RelevanceJudge: Send + Sync {
    /// Judge one post against the interest profile. `None` means no usable judgment.
    async fn evaluate(&self, title: &str, url: &str, profile: &str) -> Option<Judgment>;
}

pub struct LlmJudge {
    client: Arc<OpenAiClient>,
    model: String,
    failure_delay: Duration,
    limiter: Option<RateLimiter>,
}

impl LlmJudge {
    pub fn new(client: Arc<OpenAiClient>, config: &Config) -> Self {
        let limiter = RateLimiter::new(config.judge_rate_limit_rps);
        if let Some(l) = &limiter {
            info!(rps = l.rps(), "judge calls are rate limited");
        }
        Self {
            client,
            model: config.model.clone(),
            failure_delay: config.judge_failure_delay,
            limiter,
        }
    }

    async fn try_evaluate(
        &self,
        title: &str,
        url: &str,
        profile: &str,
    ) -> Result<Judgment, JudgeError> {
        if let Some(limiter) = &self.limiter {
            limiter.acquire().await;
        }

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![Message::user(build_prompt(profile, title, url))],
            temperature: Some(0.2),
            max_tokens: None,
        };
        let response = self.client.chat_completions(request, None).await?;
        let text = response.first_content().ok_or_else(|| {
            JudgeError::MalformedOutput("missing choices[0].message.content".to_string())
        })?;
        debug!(title, response = text, "judge responded");
        parse_judgment(text)
    }
}

#[async_trait]
impl RelevanceJudge for LlmJudge {
    async fn evaluate(&self, title: &str, url: &str, profile: &str) -> Option<Judgment> {
        match self.try_evaluate(title, url, profile).await {
            Ok(judgment) => Some(judgment),
            Err(e @ JudgeError::MalformedOutput(_)) => {
                warn!(title, error = %e, "could not parse judge response");
                None
            }
            Err(e @ JudgeError::Unavailable(_)) => {
                warn!(title, error = %e, "judge call failed");
                // Rate-limit mitigation; the item is not retried after this.
                tokio::time::sleep(self.failure_delay).await;
                None
            }
        }
    }
}
