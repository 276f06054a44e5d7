//! Deterministic local summarizer with no network dependency.

use async_trait::async_trait;

use super::{SummarizeError, Summarizer};
use crate::text::{bullet_list, clip, strip_markup};

/// Baseline best-practice bullets emitted before anything derived from the
/// answers themselves.
const BASELINE_BULLETS: [&str; 3] = [
    "Prefer async APIs; avoid blocking calls in async methods",
    "Use efficient LINQ; consider `AsSpan`, `Select` vs `SelectMany` wisely",
    "For file I/O, use `FileStream` with `useAsync: true`",
];

/// How many answer bodies contribute derived bullets.
const MAX_SOURCE_BODIES: usize = 2;
/// How many non-empty lines each body contributes.
const LINES_PER_BODY: usize = 2;
/// Display length each derived line is clipped to.
const MAX_LINE_LEN: usize = 120;

/// Heuristic summarizer: baseline bullets plus a few lines lifted from the
/// top answers. Always succeeds.
#[derive(Debug, Default)]
pub struct SimpleSummarizer;

impl SimpleSummarizer {
    /// Creates a new `SimpleSummarizer`.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Summarizer for SimpleSummarizer {
    async fn summarize(
        &self,
        _question: &str,
        answer_bodies: &[String],
    ) -> Result<String, SummarizeError> {
        let mut bullets: Vec<String> = BASELINE_BULLETS.iter().map(|b| b.to_string()).collect();

        for body in answer_bodies.iter().take(MAX_SOURCE_BODIES) {
            let text = strip_markup(body);
            bullets.extend(
                text.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .take(LINES_PER_BODY)
                    .map(|line| clip(line, MAX_LINE_LEN)),
            );
        }

        Ok(bullet_list(&bullets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn baseline_bullets_present_without_answers() {
        let summary = SimpleSummarizer::new()
            .summarize("any question", &[])
            .await
            .expect("summarize");

        assert!(summary.starts_with("- "));
        assert_eq!(summary.lines().count(), BASELINE_BULLETS.len());
        assert!(summary.contains("Prefer async APIs"));
    }

    #[tokio::test]
    async fn derived_lines_come_from_first_two_bodies_only() {
        let bodies = vec![
            "<p>first line one</p>\nfirst line two\nfirst line three".to_string(),
            "second line one".to_string(),
            "third body never used".to_string(),
        ];

        let summary = SimpleSummarizer::new()
            .summarize("q", &bodies)
            .await
            .expect("summarize");

        assert!(summary.contains("- first line one"));
        assert!(summary.contains("- first line two"));
        assert!(!summary.contains("first line three"));
        assert!(summary.contains("- second line one"));
        assert!(!summary.contains("third body"));
    }

    #[tokio::test]
    async fn markup_is_absent_from_output() {
        let bodies = vec!["<p>Use <code>FileStream</code> with useAsync true</p>".to_string()];

        let summary = SimpleSummarizer::new()
            .summarize("How to read a file asynchronously in .NET", &bodies)
            .await
            .expect("summarize");

        assert!(summary.contains("- Use FileStream with useAsync true"));
        assert!(!summary.contains('<'));
        assert!(!summary.contains('>'));
    }

    #[tokio::test]
    async fn long_derived_lines_are_clipped_with_ellipsis() {
        let bodies = vec!["y".repeat(200)];

        let summary = SimpleSummarizer::new()
            .summarize("q", &bodies)
            .await
            .expect("summarize");

        let derived = summary
            .lines()
            .last()
            .expect("at least one line");
        assert!(derived.ends_with('…'));
        // "- " prefix plus 120 kept chars plus the marker.
        assert_eq!(derived.chars().count(), 2 + MAX_LINE_LEN + 1);
    }
}
