//! Summarization strategies.
//!
//! One capability, two implementations: `OpenRouterSummarizer` calls a remote
//! chat-completion service, `SimpleSummarizer` is a deterministic local
//! heuristic. Which one runs is a deployment-time decision made once at
//! startup, never inside the pipeline.

mod openrouter;
mod simple;

pub use openrouter::{OpenRouterSummarizer, OpenRouterSummarizerBuilder};
pub use simple::SimpleSummarizer;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during remote summarization.
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// Credential precondition failure, surfaced at construction rather than
    /// retried.
    #[error("summarizer misconfigured: {0}")]
    Misconfigured(String),

    /// Network-related errors (connection failures, DNS resolution, timeouts).
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Non-success HTTP status from the completion service.
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// Response body missing the expected completion content.
    #[error("malformed completion response: {0}")]
    Malformed(String),
}

/// Produces a condensed answer from a question and a set of answer bodies.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarizes `answer_bodies` with respect to `question` into a bullet
    /// list. Markup in the bodies is stripped before it reaches any output.
    async fn summarize(
        &self,
        question: &str,
        answer_bodies: &[String],
    ) -> Result<String, SummarizeError>;
}
