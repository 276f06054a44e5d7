/// Stack Exchange HTTP client module.
///
/// Provides an async client for the Stack Exchange 2.3 API implementing the
/// search and answer-retrieval capabilities, with a two-tier search fallback.
mod client;

pub use client::{
    AnswerProvider, SearchProvider, StackApiError, StackExchangeClient, StackExchangeClientBuilder,
};
