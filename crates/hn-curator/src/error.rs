use curator_common::error::CommonError;
use curator_common::openai::OpenAiClientError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("config error: {0}")]
    Config(String),

    #[error("item source unavailable: {0}")]
    SourceUnavailable(String),
}

/// Why the judge produced no judgment for an item.
///
/// Never escapes the judge adapter: it is logged there and collapsed to "no judgment".
#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    #[error("judge unavailable: {0}")]
    Unavailable(#[from] OpenAiClientError),

    #[error("judge output malformed: {0}")]
    MalformedOutput(String),
}
