//! Reverie - autonomous generation-and-curation pipeline
//!
//! Drives language-model agents through unsupervised, goal-less
//! generation loops: each turn produces a new thought conditioned only on
//! prior generated text, scores it for interestingness, and persists
//! high-scoring results. Includes a multi-agent variant that round-robins
//! turns across agent identities over a shared transcript, with
//! curiosity-triggered web lookups.

pub mod agents;
pub mod boundary;
pub mod config;
pub mod dream;
pub mod error;
pub mod memory;
pub mod output;

// Re-exports for convenience
pub use config::DreamConfig;
pub use dream::{SessionLoop, StopSignal};
pub use error::DreamError;
pub use memory::{MemoryStore, SqliteThoughtStore};
pub use output::EventBus;
