use serde::{Deserialize, Serialize};

use super::Post;

/// The unit returned to the caller and persisted in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorResult {
    /// Condensed bullet summary of the top answers.
    pub summary: String,
    /// The full ranked post list from the search step, not just the posts
    /// that contributed answer bodies.
    pub top_posts: Vec<Post>,
}
