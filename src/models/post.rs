use serde::{Deserialize, Serialize};

/// A question-like item returned by the Stack Exchange search API.
///
/// Posts are immutable once constructed; the score is used only for
/// descending-order ranking and may be negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Question id on the remote site.
    pub id: u64,
    /// Question title.
    pub title: String,
    /// Link to the thread.
    pub link: String,
    /// Vote score at the time of the search.
    pub score: i64,
    /// Id of the accepted answer, if one exists.
    pub accepted_answer_id: Option<u64>,
}
