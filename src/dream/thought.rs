//! Thought and session records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reasoning strategy applied to a single generation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningMode {
    FreeAssociation,
    LogicalDeduction,
    CreativeWhatIf,
    PatternRecognition,
    AnalogicalReasoning,
}

impl ReasoningMode {
    pub const ALL: [ReasoningMode; 5] = [
        ReasoningMode::FreeAssociation,
        ReasoningMode::LogicalDeduction,
        ReasoningMode::CreativeWhatIf,
        ReasoningMode::PatternRecognition,
        ReasoningMode::AnalogicalReasoning,
    ];

    /// Stable identifier used in persisted records.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningMode::FreeAssociation => "free_association",
            ReasoningMode::LogicalDeduction => "logical_deduction",
            ReasoningMode::CreativeWhatIf => "creative_what_if",
            ReasoningMode::PatternRecognition => "pattern_recognition",
            ReasoningMode::AnalogicalReasoning => "analogical_reasoning",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free_association" => Some(ReasoningMode::FreeAssociation),
            "logical_deduction" => Some(ReasoningMode::LogicalDeduction),
            "creative_what_if" => Some(ReasoningMode::CreativeWhatIf),
            "pattern_recognition" => Some(ReasoningMode::PatternRecognition),
            "analogical_reasoning" => Some(ReasoningMode::AnalogicalReasoning),
            _ => None,
        }
    }

    /// The instruction fragment prepended to the short-term context.
    pub fn instruction(&self) -> &'static str {
        match self {
            ReasoningMode::FreeAssociation => {
                "Let your mind wander freely. What comes to mind next?"
            }
            ReasoningMode::LogicalDeduction => {
                "Following strict logical steps, what conclusion emerges?"
            }
            ReasoningMode::CreativeWhatIf => {
                "What if we imagined something completely different? What if..."
            }
            ReasoningMode::PatternRecognition => {
                "Looking at these ideas, what patterns or connections do you notice?"
            }
            ReasoningMode::AnalogicalReasoning => {
                "How might this be similar to something else entirely? What analogy comes to mind?"
            }
        }
    }
}

impl std::fmt::Display for ReasoningMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ReasoningMode::FreeAssociation => "free association",
            ReasoningMode::LogicalDeduction => "logical deduction",
            ReasoningMode::CreativeWhatIf => "creative what-if",
            ReasoningMode::PatternRecognition => "pattern recognition",
            ReasoningMode::AnalogicalReasoning => "analogical reasoning",
        };
        write!(f, "{}", name)
    }
}

/// One generated, scored, timestamped unit of text. Immutable once built;
/// owned by the memory store after `remember`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thought {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub mode: ReasoningMode,
    /// Set only on the first thought of a session.
    pub seed_text: Option<String>,
    pub content: String,
    pub interest_score: f64,
    pub is_gold: bool,
}

impl Thought {
    pub fn new(
        session_id: impl Into<String>,
        mode: ReasoningMode,
        content: impl Into<String>,
        interest_score: f64,
        is_gold: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            session_id: session_id.into(),
            mode,
            seed_text: None,
            content: content.into(),
            interest_score: interest_score.clamp(0.0, 1.0),
            is_gold,
        }
    }

    /// Mark this as the opening thought of its session.
    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed_text = Some(seed.into());
        self
    }
}

/// A single run of the dreaming loop. Aggregates are derived from the
/// recorded thoughts, not tracked separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn start() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn close(&mut self) {
        self.ended_at = Some(Utc::now());
    }

    pub fn duration_secs(&self) -> i64 {
        let end = self.ended_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_seconds()
    }
}

/// Aggregates of a completed session, emitted with the summary event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session: Session,
    pub thought_count: usize,
    pub gold_count: usize,
    pub average_interest: f64,
    /// Up to three highest-scoring thoughts of the session.
    pub top_thoughts: Vec<Thought>,
    /// Present when the loop stopped on an error rather than a stop
    /// condition.
    pub failure: Option<String>,
}

impl SessionSummary {
    pub fn from_thoughts(session: Session, thoughts: &[Thought], failure: Option<String>) -> Self {
        let thought_count = thoughts.len();
        let gold_count = thoughts.iter().filter(|t| t.is_gold).count();
        let average_interest = if thoughts.is_empty() {
            0.0
        } else {
            thoughts.iter().map(|t| t.interest_score).sum::<f64>() / thought_count as f64
        };
        let mut ranked: Vec<Thought> = thoughts.to_vec();
        ranked.sort_by(|a, b| {
            b.interest_score
                .partial_cmp(&a.interest_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(3);
        Self {
            session,
            thought_count,
            gold_count,
            average_interest,
            top_thoughts: ranked,
            failure,
        }
    }
}
