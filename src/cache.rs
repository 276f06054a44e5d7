/// JSON file cache module.
///
/// Provides a durable key-value store with per-entry expiration, plus the
/// object-safe [`AdvisorCache`] capability the orchestrator holds optionally.
mod json_file;

pub use json_file::{AdvisorCache, CacheError, JsonFileCache};
