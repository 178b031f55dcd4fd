//! Multi-agent turn orchestration over a shared transcript.
//!
//! Agents take turns in strict round-robin order; there is no
//! content-based moderation of whose turn is next. Generation calls are
//! serialized, one at a time, attributed to the agent whose turn it is.
//! The curiosity gate may append a synthetic search-result turn, which
//! never consumes a roster slot.

use std::sync::Arc;

use tokio::time::{sleep, Duration};
use tracing::{info, warn};

use crate::agents::curiosity::CuriosityGate;
use crate::agents::identity::{generate_roster, AgentIdentity, ConversationTurn, SEARCH_AGENT_ID};
use crate::boundary::{LanguageModel, SearchBoundary};
use crate::config::DreamConfig;
use crate::dream::interest::InterestScorer;
use crate::dream::modes::select_mode;
use crate::dream::reasoning::ReasoningStep;
use crate::dream::session::{generate_with_retry, LoopState, StopSignal};
use crate::dream::thought::{ReasoningMode, Session, SessionSummary, Thought};
use crate::error::{DreamError, Result};
use crate::memory::ThoughtStore;
use crate::output::{DreamEvent, EventBus};

use rand::seq::SliceRandom;

pub struct TurnOrchestrator {
    config: DreamConfig,
    roster: Vec<AgentIdentity>,
    step: ReasoningStep,
    scorer: InterestScorer,
    gate: CuriosityGate,
    search: Option<Arc<dyn SearchBoundary>>,
    durable: Arc<dyn ThoughtStore>,
    bus: Arc<EventBus>,
    stop: StopSignal,
    state: LoopState,
    session: Session,
    seed: String,
    transcript: Vec<ConversationTurn>,
    cursor: usize,
}

impl TurnOrchestrator {
    pub fn new(
        config: &DreamConfig,
        provider: Arc<dyn LanguageModel>,
        durable: Arc<dyn ThoughtStore>,
        search: Option<Arc<dyn SearchBoundary>>,
        bus: Arc<EventBus>,
        stop: StopSignal,
    ) -> Result<Self> {
        config.validate()?;
        let roster = generate_roster(config.roster.agent_count);
        Self::with_roster(config, roster, provider, durable, search, bus, stop)
    }

    /// Construct with an explicit roster; used by tests and by callers
    /// that persist identities across runs.
    pub fn with_roster(
        config: &DreamConfig,
        roster: Vec<AgentIdentity>,
        provider: Arc<dyn LanguageModel>,
        durable: Arc<dyn ThoughtStore>,
        search: Option<Arc<dyn SearchBoundary>>,
        bus: Arc<EventBus>,
        stop: StopSignal,
    ) -> Result<Self> {
        if roster.len() < 2 {
            return Err(DreamError::config("roster needs at least two agents"));
        }
        let seed = config
            .roster
            .conversation_seeds
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| DreamError::config("conversation seed pool must not be empty"))?;
        Ok(Self {
            config: config.clone(),
            step: ReasoningStep::new(provider, &config.boundary),
            scorer: InterestScorer::new(&config.scoring),
            gate: CuriosityGate::new(&config.roster.curiosity_markers)?,
            search,
            durable,
            bus,
            stop,
            state: LoopState::Idle,
            session: Session::start(),
            seed,
            transcript: Vec::new(),
            roster,
            cursor: 0,
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn roster(&self) -> &[AgentIdentity] {
        &self.roster
    }

    pub fn transcript(&self) -> &[ConversationTurn] {
        &self.transcript
    }

    /// Run the conversation until max-turns or an external stop.
    pub async fn run(&mut self) -> Result<SessionSummary> {
        if self.state != LoopState::Idle {
            return Err(DreamError::config(
                "orchestrator already ran; build a fresh instance",
            ));
        }
        self.state = LoopState::Running;
        info!(
            session = %self.session.session_id,
            agents = self.roster.len(),
            seed = %self.seed,
            "conversation started"
        );
        self.bus.publish(DreamEvent::SessionStarted {
            session_id: self.session.session_id.clone(),
            seed: self.seed.clone(),
        });

        let mut recorded: Vec<Thought> = Vec::new();
        let mut real_turns = 0usize;
        let mut consecutive_failures = 0usize;
        let mut failure: Option<String> = None;

        while real_turns < self.config.roster.max_turns {
            if self.stop.is_stopped() {
                info!("stop signal observed between turns");
                break;
            }

            let agent = self.roster[self.cursor].clone();
            self.cursor = (self.cursor + 1) % self.roster.len();

            let mode = select_mode(&self.config.mode_weights);
            let context = self.context_window();
            match generate_with_retry(&self.step, mode, &context, &self.config.retry).await {
                Ok(content) => {
                    consecutive_failures = 0;
                    let thought = match self.record_thought(mode, content, recorded.is_empty()).await
                    {
                        Ok(t) => t,
                        Err(e) => {
                            warn!("store write failed, aborting conversation: {}", e);
                            failure = Some(e.to_string());
                            break;
                        }
                    };

                    let query = self.gate.inspect(&thought.content);
                    self.push_turn(&agent, thought.clone(), query.is_some());
                    recorded.push(thought);
                    real_turns += 1;

                    if let Some(query) = query {
                        if let Err(e) = self.handle_curiosity(&agent, &query, &mut recorded).await {
                            warn!("store write failed, aborting conversation: {}", e);
                            failure = Some(e.to_string());
                            break;
                        }
                    }
                }
                Err(e @ DreamError::GenerationFailure(_)) => {
                    // The failed turn still belonged to this agent; the
                    // cursor has already moved on.
                    consecutive_failures += 1;
                    if consecutive_failures > self.config.generation_failure_cap {
                        warn!("generation failed {} turns in a row, stopping", consecutive_failures);
                        failure = Some(e.to_string());
                        break;
                    }
                    warn!("skipping {}'s turn after generation failure: {}", agent.display_label, e);
                }
                Err(e) => {
                    warn!("unrecoverable boundary/store error, stopping: {}", e);
                    failure = Some(e.to_string());
                    break;
                }
            }

            if self.config.pacing_secs > 0.0 && !self.stop.is_stopped() {
                sleep(Duration::from_secs_f64(self.config.pacing_secs)).await;
            }
        }

        self.state = LoopState::Stopped;
        self.session.close();
        let summary = SessionSummary::from_thoughts(self.session.clone(), &recorded, failure);
        info!(
            turns = self.transcript.len(),
            gold = summary.gold_count,
            "conversation stopped"
        );
        self.bus.publish(DreamEvent::SessionEnded {
            summary: summary.clone(),
        });
        Ok(summary)
    }

    /// Shared transcript tail, oldest-to-newest, with speaker labels. The
    /// conversation seed stays visible at the head until it scrolls out.
    fn context_window(&self) -> Vec<String> {
        let mut entries = Vec::with_capacity(self.transcript.len() + 1);
        entries.push(format!("Seed: {}", self.seed));
        for turn in &self.transcript {
            let label = self
                .roster
                .iter()
                .find(|a| a.agent_id == turn.agent_id)
                .map(|a| a.display_label.as_str())
                .unwrap_or("Search Results");
            entries.push(format!("{}: {}", label, turn.thought.content));
        }
        let start = entries.len().saturating_sub(self.config.context_window);
        entries.split_off(start)
    }

    async fn record_thought(
        &self,
        mode: ReasoningMode,
        content: String,
        first: bool,
    ) -> Result<Thought> {
        let verdict = self.scorer.score(&content);
        let mut thought = Thought::new(
            self.session.session_id.clone(),
            mode,
            content,
            verdict.score,
            verdict.is_gold,
        );
        if first {
            thought = thought.with_seed(self.seed.clone());
        }
        self.durable.append(&thought).await?;
        Ok(thought)
    }

    fn push_turn(&mut self, agent: &AgentIdentity, thought: Thought, triggered_search: bool) {
        self.bus.publish(DreamEvent::ThoughtRecorded {
            thought: thought.clone(),
            agent: Some(agent.display_label.clone()),
        });
        if thought.is_gold {
            self.bus.publish(DreamEvent::GoldStrike {
                thought: thought.clone(),
            });
        }
        self.transcript.push(ConversationTurn {
            turn_index: self.transcript.len(),
            agent_id: agent.agent_id.clone(),
            thought,
            triggered_search,
        });
    }

    /// Run the search boundary if one is attached and append the result
    /// as a synthetic turn. Without a boundary the trigger is recorded
    /// but nothing is injected.
    async fn handle_curiosity(
        &mut self,
        agent: &AgentIdentity,
        query: &str,
        recorded: &mut Vec<Thought>,
    ) -> Result<()> {
        let Some(search) = self.search.clone() else {
            self.bus.publish(DreamEvent::CuriosityTriggered {
                agent: agent.display_label.clone(),
                query: query.to_string(),
                injected: false,
            });
            return Ok(());
        };

        let summary = match search.search(query).await {
            Ok(s) => s,
            Err(e) => {
                // A failed lookup never aborts the conversation.
                warn!("search boundary failed for '{}': {}", query, e);
                String::new()
            }
        };

        let injected = !summary.is_empty();
        self.bus.publish(DreamEvent::CuriosityTriggered {
            agent: agent.display_label.clone(),
            query: query.to_string(),
            injected,
        });
        if !injected {
            return Ok(());
        }

        let thought = self
            .record_thought(ReasoningMode::PatternRecognition, summary, false)
            .await?;
        let pseudo = AgentIdentity::search_results();
        self.push_turn(&pseudo, thought.clone(), false);
        recorded.push(thought);
        debug_assert_eq!(pseudo.agent_id, SEARCH_AGENT_ID);
        Ok(())
    }
}
