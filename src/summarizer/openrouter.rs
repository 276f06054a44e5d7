//! OpenRouter-backed remote summarizer.

use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{SummarizeError, Summarizer};
use crate::text::strip_markup;

const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
const DEFAULT_MODEL: &str = "openrouter/auto";
const DEFAULT_REFERER: &str = "https://localhost";
const DEFAULT_TITLE: &str = "soadvisor";

const SYSTEM_PROMPT: &str =
    "You are a helpful programming assistant. Summarize answers into concise, actionable bullets.";

/// Builder for constructing `OpenRouterSummarizer` instances.
#[derive(Debug, Default)]
pub struct OpenRouterSummarizerBuilder {
    api_key: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    referer: Option<String>,
    title: Option<String>,
}

impl OpenRouterSummarizerBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bearer credential. Required.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the model identifier (defaults to `openrouter/auto`).
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the chat-completion endpoint URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the `HTTP-Referer` header value.
    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    /// Sets the `X-Title` header value.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builds the `OpenRouterSummarizer`.
    ///
    /// # Errors
    ///
    /// Returns `SummarizeError::Misconfigured` when no API key was provided
    /// (or it is blank), and `SummarizeError::Network` if the HTTP client
    /// cannot be constructed.
    pub fn build(self) -> Result<OpenRouterSummarizer, SummarizeError> {
        let api_key = match self.api_key {
            Some(key) if !key.trim().is_empty() => key,
            _ => {
                return Err(SummarizeError::Misconfigured(
                    "OpenRouter API key is not configured".to_string(),
                ));
            }
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(SummarizeError::Network)?;

        Ok(OpenRouterSummarizer {
            client,
            endpoint: self.endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            api_key,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            referer: self.referer.unwrap_or_else(|| DEFAULT_REFERER.to_string()),
            title: self.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        })
    }
}

/// Remote summarizer calling an OpenAI-compatible chat-completion endpoint.
pub struct OpenRouterSummarizer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    referer: String,
    title: String,
}

impl OpenRouterSummarizer {
    /// Returns the model identifier sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Summarizer for OpenRouterSummarizer {
    async fn summarize(
        &self,
        question: &str,
        answer_bodies: &[String],
    ) -> Result<String, SummarizeError> {
        let prompt = build_prompt(question, answer_bodies);

        let payload = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            temperature: 0.2,
        };

        debug!(model = %self.model, answers = answer_bodies.len(), "requesting remote summary");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&payload)
            .send()
            .await
            .map_err(SummarizeError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SummarizeError::Http {
                status: status.as_u16(),
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| SummarizeError::Malformed(e.to_string()))?;
        extract_content(body)
    }
}

/// Builds the user prompt from the question and the markup-stripped answer
/// bodies.
fn build_prompt(question: &str, answer_bodies: &[String]) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "Question: {question}");
    let _ = writeln!(prompt, "Summarize the best practices and key takeaways:");
    for (i, body) in answer_bodies.iter().enumerate() {
        let _ = writeln!(prompt, "Answer {}:\n{}\n", i + 1, strip_markup(body));
    }
    prompt.push_str("Return 3-6 bullets with code identifiers in backticks where helpful.");
    prompt
}

fn extract_content(response: ChatResponse) -> Result<String, SummarizeError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| {
            SummarizeError::Malformed("completion response missing choices[0].message.content".to_string())
        })
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_an_api_key() {
        let result = OpenRouterSummarizerBuilder::new().build();
        assert!(matches!(result, Err(SummarizeError::Misconfigured(_))));

        let result = OpenRouterSummarizerBuilder::new().api_key("   ").build();
        assert!(matches!(result, Err(SummarizeError::Misconfigured(_))));
    }

    #[test]
    fn build_applies_defaults() {
        let summarizer = OpenRouterSummarizerBuilder::new()
            .api_key("sk-test")
            .build()
            .expect("failed to build summarizer");

        assert_eq!(summarizer.model(), DEFAULT_MODEL);
        assert_eq!(summarizer.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(summarizer.referer, DEFAULT_REFERER);
        assert_eq!(summarizer.title, DEFAULT_TITLE);
    }

    #[test]
    fn build_prompt_strips_markup_and_numbers_answers() {
        let bodies = vec![
            "<p>Use <code>FileStream</code></p>".to_string(),
            "<p>Avoid blocking</p>".to_string(),
        ];

        let prompt = build_prompt("How to read a file", &bodies);

        assert!(prompt.starts_with("Question: How to read a file\n"));
        assert!(prompt.contains("Answer 1:\nUse FileStream"));
        assert!(prompt.contains("Answer 2:\nAvoid blocking"));
        assert!(!prompt.contains('<'));
    }

    #[test]
    fn extract_content_reads_first_choice() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "- bullet one"}}]}"#,
        )
        .expect("parse fixture");

        assert_eq!(extract_content(response).expect("content"), "- bullet one");
    }

    #[test]
    fn extract_content_rejects_empty_choices() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).expect("parse");
        assert!(matches!(
            extract_content(response),
            Err(SummarizeError::Malformed(_))
        ));

        let response: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"role": "assistant"}}]}"#)
                .expect("parse");
        assert!(matches!(
            extract_content(response),
            Err(SummarizeError::Malformed(_))
        ));
    }
}
