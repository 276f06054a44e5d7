//! Question-answering orchestration pipeline.
//!
//! `AdvisorService` sequences cache lookup, post search, answer gathering,
//! summarization and the cache write, applying a fallback policy at each
//! fallible step. Only search failure is fatal; every other degradation is
//! absorbed locally.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::AdvisorCache;
use crate::models::AdvisorResult;
use crate::stack_exchange::{AnswerProvider, SearchProvider, StackApiError};
use crate::summarizer::Summarizer;
use crate::text::{bullet_list, strip_markup};

/// How many posts the search step requests.
const SEARCH_LIMIT: usize = 5;
/// How many of the leading posts contribute an answer body.
const POSTS_FOR_ANSWERS: usize = 3;
/// How many answers are fetched per post.
const ANSWERS_PER_POST: usize = 1;
/// How long a cached result stays valid.
const CACHE_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Default keyword list the fallback summary uses to judge a line actionable.
const DEFAULT_FALLBACK_KEYWORDS: [&str; 3] = ["async", "LINQ", "FileStream"];

const GENERIC_FALLBACK_BULLET: &str = "Review top answers; avoid blocking; prefer async APIs.";

/// Errors fatal to [`AdvisorService::ask`].
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// Both search tiers failed; carries the final tier's diagnostic.
    #[error("search unavailable: {0}")]
    SearchUnavailable(#[source] StackApiError),
}

/// Derives the cache key for a question: trimmed, case-folded, prefixed.
pub fn cache_key(question: &str) -> String {
    format!("qa:{}", question.trim().to_lowercase())
}

/// Builder for constructing `AdvisorService` instances.
#[derive(Default)]
pub struct AdvisorServiceBuilder {
    search: Option<Arc<dyn SearchProvider>>,
    answers: Option<Arc<dyn AnswerProvider>>,
    summarizer: Option<Arc<dyn Summarizer>>,
    cache: Option<Arc<dyn AdvisorCache>>,
    fallback_keywords: Option<Vec<String>>,
}

impl AdvisorServiceBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the search capability. Required.
    pub fn search(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.search = Some(search);
        self
    }

    /// Sets the answer-retrieval capability. Required.
    pub fn answers(mut self, answers: Arc<dyn AnswerProvider>) -> Self {
        self.answers = Some(answers);
        self
    }

    /// Sets the summarization strategy. Required.
    pub fn summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Sets the optional result cache. The pipeline behaves identically
    /// without one, minus the lookup and write.
    pub fn cache(mut self, cache: Arc<dyn AdvisorCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replaces the keyword list the fallback summary uses to recognize
    /// actionable lines.
    pub fn fallback_keywords(mut self, keywords: Vec<String>) -> Self {
        self.fallback_keywords = Some(keywords);
        self
    }

    /// Builds the `AdvisorService`.
    ///
    /// # Panics
    ///
    /// Panics if `search()`, `answers()` or `summarizer()` was not called.
    #[must_use]
    pub fn build(self) -> AdvisorService {
        AdvisorService {
            search: self.search.expect("search must be set via search() method"),
            answers: self
                .answers
                .expect("answers must be set via answers() method"),
            summarizer: self
                .summarizer
                .expect("summarizer must be set via summarizer() method"),
            cache: self.cache,
            fallback_keywords: self.fallback_keywords.unwrap_or_else(|| {
                DEFAULT_FALLBACK_KEYWORDS
                    .iter()
                    .map(|kw| kw.to_string())
                    .collect()
            }),
        }
    }
}

/// Orchestrates the question-answering pipeline over its collaborators.
pub struct AdvisorService {
    search: Arc<dyn SearchProvider>,
    answers: Arc<dyn AnswerProvider>,
    summarizer: Arc<dyn Summarizer>,
    cache: Option<Arc<dyn AdvisorCache>>,
    fallback_keywords: Vec<String>,
}

impl AdvisorService {
    /// Answers `question`, returning the summary and the ranked post list.
    ///
    /// A fresh result is cached for 12 hours; an unexpired cached result
    /// short-circuits every remaining step, including summarization.
    ///
    /// # Errors
    ///
    /// Returns `AdvisorError::SearchUnavailable` when both search tiers
    /// failed. Answer, summarizer and cache failures are recovered locally
    /// and never fail the operation.
    pub async fn ask(&self, question: &str) -> Result<AdvisorResult, AdvisorError> {
        let key = cache_key(question);

        if let Some(cache) = &self.cache {
            match cache.get(&key).await {
                Ok(Some(hit)) => {
                    debug!(key = %key, "cache hit");
                    return Ok(hit);
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "cache read failed, treating as miss"),
            }
        }

        let posts = self
            .search
            .search_posts(question, SEARCH_LIMIT)
            .await
            .map_err(AdvisorError::SearchUnavailable)?;

        let mut answer_bodies = Vec::new();
        for post in posts.iter().take(POSTS_FOR_ANSWERS) {
            match self.answers.top_answers(post.id, ANSWERS_PER_POST).await {
                Ok(answers) => {
                    if let Some(answer) = answers.first() {
                        if !answer.body.trim().is_empty() {
                            answer_bodies.push(answer.body.clone());
                        }
                    }
                }
                Err(e) => {
                    debug!(post_id = post.id, error = %e, "skipping post, answers unavailable");
                }
            }
        }

        let summary = match self.summarizer.summarize(question, &answer_bodies).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "summarizer failed, using local bullet extraction");
                self.fallback_summary(&answer_bodies)
            }
        };

        let result = AdvisorResult {
            summary,
            top_posts: posts,
        };

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&key, &result, CACHE_TTL).await {
                warn!(error = %e, "cache write failed, returning uncached result");
            }
        }

        Ok(result)
    }

    /// Deterministic last-resort summary: keeps stripped answer lines that
    /// look actionable, either bullet-marked or mentioning a configured
    /// keyword.
    fn fallback_summary(&self, answer_bodies: &[String]) -> String {
        let mut bullets = Vec::new();

        for body in answer_bodies {
            let plain = strip_markup(body);
            for line in plain.lines() {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let actionable = trimmed.starts_with('-')
                    || trimmed.starts_with('*')
                    || self
                        .fallback_keywords
                        .iter()
                        .any(|kw| trimmed.contains(kw.as_str()));
                if actionable {
                    bullets.push(trimmed.trim_start_matches(['-', '*', ' ']).to_string());
                }
            }
        }

        if bullets.is_empty() {
            bullets.push(GENERIC_FALLBACK_BULLET.to_string());
        }
        bullet_list(&bullets)
    }
}
