//! External boundaries: language model and web search.

pub mod provider;
pub mod search;

pub use provider::{build_provider, CompletionOptions, LanguageModel};
pub use search::{DuckDuckGoSearch, SearchBoundary};
