//! File-backed cache with per-entry expiration.
//!
//! Each key maps to one JSON file under the cache directory holding the value
//! together with an absolute expiry timestamp. Expired entries are treated
//! exactly like absent entries; they are not proactively deleted.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

use crate::models::AdvisorResult;

/// Errors that can occur while reading or writing cache records.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Storage I/O failure other than a missing record.
    #[error("cache I/O error: {0}")]
    Io(#[source] io::Error),

    /// The record exists but does not parse as a cache entry.
    #[error("corrupt cache record: {0}")]
    Corrupt(#[source] serde_json::Error),
}

/// Cache capability as seen by the orchestrator.
///
/// Object-safe so the orchestrator can hold `Option<Arc<dyn AdvisorCache>>`
/// and tests can substitute in-memory implementations.
#[async_trait]
pub trait AdvisorCache: Send + Sync {
    /// Returns the cached result for `key` if present and unexpired.
    async fn get(&self, key: &str) -> Result<Option<AdvisorResult>, CacheError>;

    /// Durably stores `value` under `key`, expiring after `ttl`. Overwrites
    /// any prior entry for the same key.
    async fn set(&self, key: &str, value: &AdvisorResult, ttl: Duration) -> Result<(), CacheError>;
}

/// On-disk record wrapping a value with its expiry instant.
#[derive(Serialize, Deserialize)]
struct CacheEntry<T> {
    value: T,
    #[serde(with = "time::serde::timestamp")]
    expires_at: OffsetDateTime,
}

/// Key-value store writing one JSON file per key.
pub struct JsonFileCache {
    dir: PathBuf,
}

impl JsonFileCache {
    /// Creates a cache rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Io` if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(CacheError::Io)?;
        Ok(Self { dir })
    }

    /// Returns the directory this cache writes into.
    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    /// Reads the value stored under `key`.
    ///
    /// Missing and expired records both yield `Ok(None)`; only I/O failures
    /// and unparseable records are errors.
    pub async fn get_value<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let path = self.entry_path(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::Io(e)),
        };

        let entry: CacheEntry<T> = serde_json::from_slice(&bytes).map_err(CacheError::Corrupt)?;
        if OffsetDateTime::now_utc() >= entry.expires_at {
            return Ok(None);
        }
        Ok(Some(entry.value))
    }

    /// Stores `value` under `key` with `expires_at = now + ttl`.
    pub async fn set_value<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let entry = CacheEntry {
            value,
            expires_at: OffsetDateTime::now_utc() + ttl,
        };
        let bytes = serde_json::to_vec_pretty(&entry).map_err(CacheError::Corrupt)?;
        tokio::fs::write(self.entry_path(key), bytes)
            .await
            .map_err(CacheError::Io)
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

#[async_trait]
impl AdvisorCache for JsonFileCache {
    async fn get(&self, key: &str) -> Result<Option<AdvisorResult>, CacheError> {
        self.get_value(key).await
    }

    async fn set(&self, key: &str, value: &AdvisorResult, ttl: Duration) -> Result<(), CacheError> {
        self.set_value(key, value, ttl).await
    }
}

/// Replaces filesystem-unsafe characters with `_`, one character per
/// character so distinct keys in the normalized-question key space stay
/// distinct on disk.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Post;

    fn sample_result() -> AdvisorResult {
        AdvisorResult {
            summary: "- Prefer async APIs".to_string(),
            top_posts: vec![Post {
                id: 1,
                title: "title".to_string(),
                link: "https://stackoverflow.com/q/1".to_string(),
                score: 50,
                accepted_answer_id: Some(7),
            }],
        }
    }

    fn cache_in(dir: &tempfile::TempDir) -> JsonFileCache {
        JsonFileCache::new(dir.path().join("cache")).expect("failed to create cache")
    }

    #[tokio::test]
    async fn get_returns_none_for_missing_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = cache_in(&dir);

        let got: Option<AdvisorResult> = cache.get_value("qa:missing").await.expect("get");
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = cache_in(&dir);
        let value = sample_result();

        cache
            .set_value("qa:how to read a file", &value, Duration::from_secs(3600))
            .await
            .expect("set");
        let got: Option<AdvisorResult> =
            cache.get_value("qa:how to read a file").await.expect("get");

        assert_eq!(got, Some(value));
    }

    #[tokio::test]
    async fn expired_entry_is_treated_as_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = cache_in(&dir);

        cache
            .set_value("qa:expired", &sample_result(), Duration::ZERO)
            .await
            .expect("set");
        let got: Option<AdvisorResult> = cache.get_value("qa:expired").await.expect("get");

        assert!(got.is_none());
    }

    #[tokio::test]
    async fn set_overwrites_prior_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = cache_in(&dir);
        let ttl = Duration::from_secs(3600);

        cache.set_value("qa:k", &"first", ttl).await.expect("set");
        cache.set_value("qa:k", &"second", ttl).await.expect("set");

        let got: Option<String> = cache.get_value("qa:k").await.expect("get");
        assert_eq!(got.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn corrupt_record_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = cache_in(&dir);

        std::fs::write(cache.dir().join("qa_broken.json"), b"not json at all").expect("write");
        let result: Result<Option<AdvisorResult>, _> = cache.get_value("qa:broken").await;

        assert!(matches!(result, Err(CacheError::Corrupt(_))));
    }

    #[tokio::test]
    async fn keys_with_unsafe_characters_still_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = cache_in(&dir);
        let key = "qa:what does a/b :: c<d> \"mean\"?";

        cache
            .set_value(key, &sample_result(), Duration::from_secs(60))
            .await
            .expect("set");
        let got: Option<AdvisorResult> = cache.get_value(key).await.expect("get");

        assert!(got.is_some());
    }

    #[test]
    fn sanitize_key_keeps_distinct_keys_distinct() {
        assert_ne!(sanitize_key("a/b"), sanitize_key("a/bb"));
        assert_eq!(sanitize_key("a/b"), "a_b");
        assert_eq!(sanitize_key("plain key"), "plain key");
    }
}
