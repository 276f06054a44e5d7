pub mod advisor;
pub mod cache;
pub mod config;
pub mod models;
pub mod stack_exchange;
pub mod summarizer;
pub mod text;

pub use advisor::{AdvisorError, AdvisorService, AdvisorServiceBuilder, cache_key};
pub use cache::{AdvisorCache, CacheError, JsonFileCache};
pub use models::{AdvisorResult, AnswerRecord, Post};
pub use stack_exchange::{
    AnswerProvider, SearchProvider, StackApiError, StackExchangeClient, StackExchangeClientBuilder,
};
pub use summarizer::{
    OpenRouterSummarizer, OpenRouterSummarizerBuilder, SimpleSummarizer, SummarizeError, Summarizer,
};
