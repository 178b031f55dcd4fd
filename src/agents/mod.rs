//! Multi-agent extension: round-robin dialogue over a shared transcript
//! with curiosity-triggered external lookups.

pub mod curiosity;
pub mod identity;
pub mod orchestrator;

pub use curiosity::CuriosityGate;
pub use identity::{generate_roster, AgentIdentity, ConversationTurn};
pub use orchestrator::TurnOrchestrator;
