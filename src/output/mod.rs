//! Output collaborators: live event stream, console display, artifacts.
//!
//! The core loop only publishes events; presentation layers subscribe and
//! render. The bus is an explicit instance passed at construction, and
//! publishing never blocks the writing loop.

pub mod artifacts;
pub mod console;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::dream::thought::{SessionSummary, Thought};

/// Live events emitted by the session loop and turn orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum DreamEvent {
    /// A loop entered `Running` with its opening seed.
    SessionStarted { session_id: String, seed: String },
    /// One thought was scored and persisted. `agent` is set for
    /// orchestrated multi-agent turns.
    ThoughtRecorded {
        thought: Thought,
        agent: Option<String>,
    },
    /// A thought crossed the gold threshold or carried a gold keyword.
    GoldStrike { thought: Thought },
    /// The curiosity gate opened. `injected` is false when no search
    /// boundary is attached or nothing usable came back.
    CuriosityTriggered {
        agent: String,
        query: String,
        injected: bool,
    },
    /// A loop reached `Stopped`.
    SessionEnded { summary: SessionSummary },
}

/// Broadcast fan-out to presentation subscribers. Slow readers lag and
/// drop events; the writing loop is never back-pressured.
pub struct EventBus {
    tx: broadcast::Sender<DreamEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1024);
        Self { tx }
    }

    pub fn publish(&self, event: DreamEvent) {
        // A send error only means nobody is listening right now.
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DreamEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
