use serde::{Deserialize, Serialize};

/// A candidate answer to a specific post.
///
/// The body may contain HTML markup as delivered by the API; callers strip it
/// before the text reaches any summarization input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// Answer id on the remote site.
    pub id: u64,
    /// Answer body, possibly containing markup.
    pub body: String,
    /// Vote score, ranking-only, may be negative.
    pub score: i64,
    /// Whether the post author accepted this answer.
    pub is_accepted: bool,
}
