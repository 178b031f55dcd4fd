//! Immutable configuration for the dreaming pipeline.
//!
//! Loaded once at startup and passed by reference to each component at
//! construction; no component reads ambient global state. Invalid or
//! missing required options fail fast here, never mid-loop.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dream::thought::ReasoningMode;
use crate::error::{DreamError, Result};

/// Which language-model boundary protocol to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Ollama,
    OpenAiCompatible,
}

/// Language-model boundary settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryConfig {
    pub provider: ProviderKind,
    pub url: String,
    pub model: String,
    /// Per-call temperature is drawn uniformly from this band.
    pub creativity_min: f64,
    pub creativity_max: f64,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Ollama,
            url: "http://localhost:11434".to_string(),
            model: "gemma2:2b".to_string(),
            creativity_min: 0.7,
            creativity_max: 1.2,
        }
    }
}

/// Bounded retry policy for `BoundaryUnavailable` failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: u32,
    /// Base delay; doubled on each attempt.
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_ms: 500,
        }
    }
}

/// Lexical signals and weights for interest scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Composite score above which a thought is a gold strike.
    pub gold_threshold: f64,
    /// Console/display tier boundary for "interesting" thoughts.
    pub interest_threshold: f64,
    /// Discovery keywords; the fraction present forms the lexical signal.
    pub discovery_keywords: Vec<String>,
    /// Breakthrough keywords; any hit forces `is_gold` regardless of score.
    pub gold_keywords: Vec<String>,
    pub lexical_weight: f64,
    pub length_weight: f64,
    pub question_weight: f64,
    pub excitement_weight: f64,
    /// Content length (chars) beyond which extra length adds nothing.
    pub length_saturation: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            gold_threshold: 0.6,
            interest_threshold: 0.4,
            discovery_keywords: [
                "connection",
                "pattern",
                "similar",
                "reminds me",
                "what if",
                "perhaps",
                "interesting",
                "fascinating",
                "beautiful",
                "elegant",
                "paradox",
                "contradiction",
                "unexpected",
                "surprising",
                "discovery",
                "insight",
                "realization",
                "understanding",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            gold_keywords: [
                "breakthrough",
                "eureka",
                "suddenly clear",
                "now i see",
                "this explains",
                "the key is",
                "fundamental",
                "profound",
                "revolutionary",
                "paradigm",
                "transforms everything",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            lexical_weight: 0.4,
            length_weight: 0.2,
            question_weight: 0.2,
            excitement_weight: 0.2,
            length_saturation: 400,
        }
    }
}

/// Pools the seed generator samples from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    pub concepts: Vec<String>,
    pub questions: Vec<String>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            concepts: [
                "consciousness",
                "infinity",
                "emergence",
                "patterns",
                "symmetry",
                "chaos",
                "order",
                "connection",
                "transformation",
                "paradox",
                "time",
                "space",
                "energy",
                "information",
                "complexity",
                "ocean",
                "mountain",
                "crystal",
                "river",
                "star",
                "fire",
                "ice",
                "light",
                "shadow",
                "music",
                "silence",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            questions: [
                "What if time moved backwards?",
                "How do patterns emerge from chaos?",
                "What connects all living things?",
                "Why do we find certain things beautiful?",
                "What is the nature of consciousness?",
                "How does complexity arise from simplicity?",
                "What would a perfect system look like?",
                "How do ideas spread and evolve?",
                "What makes something meaningful?",
                "How do we know what we know?",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Multi-agent orchestration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    pub agent_count: usize,
    pub max_turns: usize,
    /// Markers that open the curiosity gate. Distinct from the scorer's
    /// lexical signals.
    pub curiosity_markers: Vec<String>,
    /// Opening lines for agent conversations.
    pub conversation_seeds: Vec<String>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            agent_count: 3,
            max_turns: 20,
            curiosity_markers: [
                "i wonder",
                "i'm curious",
                "what would happen",
                "how does",
                "why do",
                "why does",
                "what causes",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            conversation_seeds: [
                "I've been thinking about the nature of time...",
                "What if consciousness is more like water than we think?",
                "There's something fascinating about how patterns emerge everywhere.",
                "I wonder about the connection between music and mathematics.",
                "The way plants grow reminds me of how ideas spread.",
                "The space between thoughts might be where creativity lives.",
                "The relationship between order and chaos keeps puzzling me.",
                "Sometimes I think language shapes reality more than we realize.",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

fn default_mode_weights() -> HashMap<ReasoningMode, f64> {
    HashMap::from([
        (ReasoningMode::FreeAssociation, 0.3),
        (ReasoningMode::LogicalDeduction, 0.2),
        (ReasoningMode::CreativeWhatIf, 0.2),
        (ReasoningMode::PatternRecognition, 0.15),
        (ReasoningMode::AnalogicalReasoning, 0.15),
    ])
}

/// Top-level configuration for the dreaming pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DreamConfig {
    pub boundary: BoundaryConfig,
    pub retry: RetryConfig,
    pub scoring: ScoringConfig,
    pub seeds: SeedConfig,
    pub roster: RosterConfig,
    /// Relative weights for the reasoning-mode draw. Need not sum to 1.
    pub mode_weights: HashMap<ReasoningMode, f64>,
    /// Minimum delay between turns, independent of call latency.
    pub pacing_secs: f64,
    pub max_thoughts: usize,
    /// Short-term context window size W.
    pub context_window: usize,
    /// Consecutive `GenerationFailure`s tolerated before aborting.
    pub generation_failure_cap: usize,
    pub db_path: String,
    pub output_dir: String,
}

impl Default for DreamConfig {
    fn default() -> Self {
        Self {
            boundary: BoundaryConfig::default(),
            retry: RetryConfig::default(),
            scoring: ScoringConfig::default(),
            seeds: SeedConfig::default(),
            roster: RosterConfig::default(),
            mode_weights: default_mode_weights(),
            pacing_secs: 5.0,
            max_thoughts: 100,
            context_window: 20,
            generation_failure_cap: 2,
            db_path: "dreaming_memory.db".to_string(),
            output_dir: "dream_outputs".to_string(),
        }
    }
}

impl DreamConfig {
    /// Load from a JSON file, creating it with defaults on first run.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| DreamError::config(format!("cannot read {}: {}", path.display(), e)))?;
            serde_json::from_str(&raw)
                .map_err(|e| DreamError::config(format!("invalid config {}: {}", path.display(), e)))?
        } else {
            let config = DreamConfig::default();
            let raw = serde_json::to_string_pretty(&config)
                .map_err(|e| DreamError::config(e.to_string()))?;
            std::fs::write(path, raw)
                .map_err(|e| DreamError::config(format!("cannot write {}: {}", path.display(), e)))?;
            info!("created default configuration at {}", path.display());
            config
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would fail mid-loop.
    pub fn validate(&self) -> Result<()> {
        if self.boundary.url.trim().is_empty() {
            return Err(DreamError::config("boundary url must not be empty"));
        }
        if self.boundary.model.trim().is_empty() {
            return Err(DreamError::config("boundary model must not be empty"));
        }
        if self.boundary.creativity_min > self.boundary.creativity_max {
            return Err(DreamError::config("creativity_min exceeds creativity_max"));
        }
        if self.seeds.concepts.len() < 2 {
            return Err(DreamError::config(
                "seed concept pool needs at least two entries",
            ));
        }
        if self.seeds.questions.is_empty() {
            return Err(DreamError::config("seed question pool must not be empty"));
        }
        for (range, name) in [
            (self.scoring.gold_threshold, "gold_threshold"),
            (self.scoring.interest_threshold, "interest_threshold"),
        ] {
            if !(0.0..=1.0).contains(&range) {
                return Err(DreamError::config(format!("{} must be in [0, 1]", name)));
            }
        }
        if self.mode_weights.values().any(|w| *w < 0.0 || !w.is_finite()) {
            return Err(DreamError::config("mode weights must be finite and >= 0"));
        }
        if self.max_thoughts == 0 {
            return Err(DreamError::config("max_thoughts must be at least 1"));
        }
        if self.context_window == 0 {
            return Err(DreamError::config("context_window must be at least 1"));
        }
        if self.pacing_secs < 0.0 || !self.pacing_secs.is_finite() {
            return Err(DreamError::config("pacing_secs must be finite and >= 0"));
        }
        if self.roster.agent_count < 2 {
            return Err(DreamError::config("roster needs at least two agents"));
        }
        if self.roster.max_turns == 0 {
            return Err(DreamError::config("roster max_turns must be at least 1"));
        }
        if self.roster.conversation_seeds.is_empty() {
            return Err(DreamError::config("conversation seed pool must not be empty"));
        }
        Ok(())
    }
}
