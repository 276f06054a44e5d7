//! Stack Exchange API client implementation.
//!
//! One `StackExchangeClient` serves both capabilities the pipeline needs:
//! post search (with a two-tier fallback query strategy) and per-question
//! answer retrieval.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::models::{AnswerRecord, Post};

const DEFAULT_BASE_URL: &str = "https://api.stackexchange.com/2.3";
const DEFAULT_SITE: &str = "stackoverflow";
const DEFAULT_TAGGED: &str = ".net;c#";
const USER_AGENT: &str = concat!("soadvisor/", env!("CARGO_PKG_VERSION"), " (+https://example.local)");

/// Errors that can occur when talking to the Stack Exchange API.
#[derive(Debug, Error)]
pub enum StackApiError {
    /// Network-related errors (connection failures, DNS resolution, timeouts).
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Non-success HTTP status from the API.
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// Response body that does not parse as the expected shape.
    #[error("malformed API response: {0}")]
    Malformed(String),

    /// Invalid base URL configuration.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl StackApiError {
    /// True for failures of the remote call itself, the class of errors the
    /// search fallback tier is allowed to recover from.
    fn is_call_failure(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Http { .. })
    }
}

/// Capability to search for candidate posts.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Searches for up to `limit` posts matching `query`, sorted by
    /// descending score.
    async fn search_posts(&self, query: &str, limit: usize) -> Result<Vec<Post>, StackApiError>;
}

/// Capability to fetch the top answers for a specific post.
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    /// Fetches up to `limit` answers for `question_id`, sorted by descending
    /// score. No fallback tier; a failure here is expected to be recovered by
    /// the caller.
    async fn top_answers(
        &self,
        question_id: u64,
        limit: usize,
    ) -> Result<Vec<AnswerRecord>, StackApiError>;
}

/// Builder for constructing `StackExchangeClient` instances.
#[derive(Debug, Default)]
pub struct StackExchangeClientBuilder {
    base_url: Option<String>,
    site: Option<String>,
    tagged: Option<String>,
    api_key: Option<String>,
}

impl StackExchangeClientBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API base URL (defaults to the public 2.3 endpoint).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the target site (defaults to `stackoverflow`).
    pub fn site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    /// Sets the semicolon-separated tag filter applied by the advanced search
    /// tier (defaults to `.net;c#`). The fallback tier never filters by tag.
    pub fn tagged(mut self, tagged: impl Into<String>) -> Self {
        self.tagged = Some(tagged.into());
        self
    }

    /// Sets the Stack Exchange API key, sent with every request.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Builds the `StackExchangeClient`.
    ///
    /// # Errors
    ///
    /// Returns `StackApiError::InvalidUrl` for an unparseable base URL, or
    /// `StackApiError::Network` if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<StackExchangeClient, StackApiError> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        reqwest::Url::parse(&base_url)
            .map_err(|e| StackApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(StackApiError::Network)?;

        Ok(StackExchangeClient {
            client,
            base_url,
            site: self.site.unwrap_or_else(|| DEFAULT_SITE.to_string()),
            tagged: self.tagged.unwrap_or_else(|| DEFAULT_TAGGED.to_string()),
            api_key: self.api_key,
        })
    }
}

/// Async HTTP client for the Stack Exchange API.
pub struct StackExchangeClient {
    client: reqwest::Client,
    base_url: String,
    site: String,
    tagged: String,
    api_key: Option<String>,
}

impl StackExchangeClient {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the site identifier configured for this client.
    pub fn site(&self) -> &str {
        &self.site
    }

    /// Fetches `items` from an API endpoint, checking the HTTP status before
    /// deserializing.
    async fn fetch_items<T: DeserializeOwned>(
        &self,
        url: String,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>, StackApiError> {
        let mut request = self.client.get(&url).query(params);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request.send().await.map_err(StackApiError::Network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(StackApiError::Http {
                status: status.as_u16(),
            });
        }

        let wrapper: ItemsWrapper<T> = response
            .json()
            .await
            .map_err(|e| StackApiError::Malformed(e.to_string()))?;
        Ok(wrapper.items)
    }

    async fn search_advanced(&self, query: &str, limit: usize) -> Result<Vec<Post>, StackApiError> {
        let pagesize = limit.to_string();
        let params = [
            ("order", "desc"),
            ("sort", "relevance"),
            ("q", query),
            ("tagged", self.tagged.as_str()),
            ("site", self.site.as_str()),
            ("pagesize", pagesize.as_str()),
        ];
        let items = self
            .fetch_items::<QuestionItem>(format!("{}/search/advanced", self.base_url), &params)
            .await?;
        Ok(rank_posts(items, limit))
    }

    /// Title-only search without the tag filter. The simpler query form
    /// tolerates input the advanced syntax rejects.
    async fn search_title_only(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Post>, StackApiError> {
        let pagesize = limit.to_string();
        let params = [
            ("order", "desc"),
            ("sort", "relevance"),
            ("intitle", query),
            ("site", self.site.as_str()),
            ("pagesize", pagesize.as_str()),
        ];
        let items = self
            .fetch_items::<QuestionItem>(format!("{}/search", self.base_url), &params)
            .await?;
        Ok(rank_posts(items, limit))
    }
}

#[async_trait]
impl SearchProvider for StackExchangeClient {
    async fn search_posts(&self, query: &str, limit: usize) -> Result<Vec<Post>, StackApiError> {
        match self.search_advanced(query, limit).await {
            Ok(posts) => Ok(posts),
            Err(e) if e.is_call_failure() => {
                debug!(error = %e, "advanced search failed, falling back to title-only search");
                self.search_title_only(query, limit).await
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl AnswerProvider for StackExchangeClient {
    async fn top_answers(
        &self,
        question_id: u64,
        limit: usize,
    ) -> Result<Vec<AnswerRecord>, StackApiError> {
        let pagesize = limit.to_string();
        let params = [
            ("order", "desc"),
            ("sort", "votes"),
            ("site", self.site.as_str()),
            ("filter", "withbody"),
            ("pagesize", pagesize.as_str()),
        ];
        let items = self
            .fetch_items::<AnswerItem>(
                format!("{}/questions/{}/answers", self.base_url, question_id),
                &params,
            )
            .await?;
        Ok(rank_answers(items, limit))
    }
}

/// Common envelope of every Stack Exchange API response.
#[derive(Deserialize)]
struct ItemsWrapper<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Deserialize)]
struct QuestionItem {
    question_id: u64,
    title: Option<String>,
    link: Option<String>,
    #[serde(default)]
    score: i64,
    accepted_answer_id: Option<u64>,
}

#[derive(Deserialize)]
struct AnswerItem {
    answer_id: u64,
    body: Option<String>,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    is_accepted: bool,
}

fn rank_posts(items: Vec<QuestionItem>, limit: usize) -> Vec<Post> {
    let mut posts: Vec<Post> = items
        .into_iter()
        .map(|item| Post {
            id: item.question_id,
            title: item.title.unwrap_or_default(),
            link: item.link.unwrap_or_default(),
            score: item.score,
            accepted_answer_id: item.accepted_answer_id,
        })
        .collect();
    posts.sort_by(|a, b| b.score.cmp(&a.score));
    posts.truncate(limit);
    posts
}

fn rank_answers(items: Vec<AnswerItem>, limit: usize) -> Vec<AnswerRecord> {
    let mut answers: Vec<AnswerRecord> = items
        .into_iter()
        .map(|item| AnswerRecord {
            id: item.answer_id,
            body: item.body.unwrap_or_default(),
            score: item.score,
            is_accepted: item.is_accepted,
        })
        .collect();
    answers.sort_by(|a, b| b.score.cmp(&a.score));
    answers.truncate(limit);
    answers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_defaults() {
        let client = StackExchangeClientBuilder::new()
            .build()
            .expect("failed to build client");
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.site(), "stackoverflow");
        assert_eq!(client.tagged, ".net;c#");
        assert!(client.api_key.is_none());
    }

    #[test]
    fn builder_rejects_invalid_base_url() {
        let result = StackExchangeClientBuilder::new()
            .base_url("not a url")
            .build();
        assert!(matches!(result, Err(StackApiError::InvalidUrl(_))));
    }

    #[test]
    fn rank_posts_sorts_descending_and_truncates() {
        let wrapper: ItemsWrapper<QuestionItem> = serde_json::from_str(
            r#"{
                "items": [
                    {"question_id": 1, "title": "low", "link": "l1", "score": 2},
                    {"question_id": 2, "title": "high", "link": "l2", "score": 50, "accepted_answer_id": 9},
                    {"question_id": 3, "title": "negative", "link": "l3", "score": -4},
                    {"question_id": 4, "title": "mid", "link": "l4", "score": 10}
                ]
            }"#,
        )
        .expect("parse fixture");

        let posts = rank_posts(wrapper.items, 3);

        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].id, 2);
        assert_eq!(posts[0].accepted_answer_id, Some(9));
        assert_eq!(posts[1].id, 4);
        assert_eq!(posts[2].id, 1);
    }

    #[test]
    fn rank_posts_tolerates_missing_optional_fields() {
        let wrapper: ItemsWrapper<QuestionItem> =
            serde_json::from_str(r#"{"items": [{"question_id": 5}]}"#).expect("parse fixture");

        let posts = rank_posts(wrapper.items, 5);

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "");
        assert_eq!(posts[0].score, 0);
        assert_eq!(posts[0].accepted_answer_id, None);
    }

    #[test]
    fn missing_items_field_parses_as_empty() {
        let wrapper: ItemsWrapper<QuestionItem> =
            serde_json::from_str(r#"{"has_more": false}"#).expect("parse fixture");
        assert!(wrapper.items.is_empty());
    }

    #[test]
    fn rank_answers_sorts_descending_and_truncates() {
        let wrapper: ItemsWrapper<AnswerItem> = serde_json::from_str(
            r#"{
                "items": [
                    {"answer_id": 10, "body": "<p>b</p>", "score": 1, "is_accepted": false},
                    {"answer_id": 11, "body": "<p>a</p>", "score": 30, "is_accepted": true}
                ]
            }"#,
        )
        .expect("parse fixture");

        let answers = rank_answers(wrapper.items, 1);

        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].id, 11);
        assert!(answers[0].is_accepted);
    }

    /// Requires network access to the public API; run with `--ignored`.
    #[tokio::test]
    #[ignore]
    async fn search_posts_against_live_api() {
        let client = StackExchangeClientBuilder::new()
            .build()
            .expect("failed to build client");

        let posts = client
            .search_posts("read file asynchronously", 5)
            .await
            .expect("live search failed");

        assert!(posts.len() <= 5);
    }
}
