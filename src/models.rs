mod advisor_result;
mod answer;
mod post;

pub use advisor_result::AdvisorResult;
pub use answer::AnswerRecord;
pub use post::Post;
