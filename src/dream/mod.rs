//! The single-agent dreaming pipeline: seeds, modes, generation,
//! scoring, and the session loop that chains them.

pub mod interest;
pub mod modes;
pub mod reasoning;
pub mod seed;
pub mod session;
pub mod thought;

pub use interest::{InterestScorer, InterestVerdict};
pub use reasoning::ReasoningStep;
pub use seed::SeedGenerator;
pub use session::{LoopState, SessionLoop, StopSignal};
pub use thought::{ReasoningMode, Session, SessionSummary, Thought};
