//! Environment-backed configuration.
//!
//! The binary loads `.env` via dotenvy before reading these; the library
//! itself never touches the environment outside this module. Presence of the
//! OpenRouter key is what selects the remote summarizer at startup.

use std::env;
use std::path::PathBuf;

/// Runtime configuration collected from environment variables.
#[derive(Debug, Default)]
pub struct Config {
    /// Optional Stack Exchange API key (`STACKEXCHANGE_KEY`).
    pub stack_exchange_key: Option<String>,
    /// Optional override for the advanced-tier tag filter (`SOADVISOR_TAGS`).
    pub tagged: Option<String>,
    /// OpenRouter credential (`OPENROUTER_API_KEY`); absence selects the
    /// local summarizer.
    pub openrouter_api_key: Option<String>,
    /// Model identifier (`OPENROUTER_MODEL`).
    pub openrouter_model: Option<String>,
    /// `HTTP-Referer` metadata (`OPENROUTER_SITE`).
    pub openrouter_referer: Option<String>,
    /// `X-Title` metadata (`OPENROUTER_TITLE`).
    pub openrouter_title: Option<String>,
    /// Cache directory override (`SOADVISOR_CACHE_DIR`).
    pub cache_dir: Option<PathBuf>,
}

impl Config {
    /// Reads configuration from the process environment. Blank values are
    /// treated as unset.
    pub fn from_env() -> Self {
        Self {
            stack_exchange_key: non_blank(env::var("STACKEXCHANGE_KEY").ok()),
            tagged: non_blank(env::var("SOADVISOR_TAGS").ok()),
            openrouter_api_key: non_blank(env::var("OPENROUTER_API_KEY").ok()),
            openrouter_model: non_blank(env::var("OPENROUTER_MODEL").ok()),
            openrouter_referer: non_blank(env::var("OPENROUTER_SITE").ok()),
            openrouter_title: non_blank(env::var("OPENROUTER_TITLE").ok()),
            cache_dir: non_blank(env::var("SOADVISOR_CACHE_DIR").ok()).map(PathBuf::from),
        }
    }
}

/// Returns the cross-platform default cache directory,
/// `{cache_dir}/soadvisor`.
pub fn default_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("soadvisor"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_blank_filters_empty_and_whitespace() {
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(String::new())), None);
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(Some("value".to_string())), Some("value".to_string()));
    }

    #[test]
    fn default_cache_dir_ends_with_crate_name() {
        if let Some(dir) = default_cache_dir() {
            assert!(dir.ends_with("soadvisor"));
        }
    }
}
