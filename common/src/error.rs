//! Error taxonomy
//!
//! `FetchError` is recovered inside the ingestion stage and `LlmError` inside
//! each analysis branch. Only `PipelineError` ever ends a run.

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of the Bounded Fetch against the KOL feed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("http error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("Invalid JSON response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl FetchError {
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(timeout_secs)
        } else {
            FetchError::Http(err)
        }
    }
}

/// Failure of a single-shot remote call to a language model
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{provider} API key is not set")]
    MissingApiKey { provider: &'static str },

    #[error("chat completion requires at least one message")]
    EmptyMessages,

    #[error("http error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("api error {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("decode error: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("completion contained no text")]
    EmptyCompletion,

    #[error("{0}")]
    Other(String),
}

impl LlmError {
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Http(err)
        }
    }
}

/// Terminal failures of a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The join itself could not complete; branch failures never land here
    #[error("join failure: {0}")]
    JoinFailure(String),

    #[error("synthesis failed: {0}")]
    Synthesis(#[source] LlmError),
}
