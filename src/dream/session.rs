//! Single-agent session loop: Idle -> Running -> Stopped.
//!
//! Each turn chains ModeSelector -> ReasoningStep -> InterestScorer ->
//! MemoryStore. The stop signal is checked cooperatively between turns;
//! an in-flight boundary call is allowed to complete so its content is
//! never discarded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::boundary::LanguageModel;
use crate::config::{DreamConfig, RetryConfig};
use crate::dream::interest::InterestScorer;
use crate::dream::modes::select_mode;
use crate::dream::reasoning::ReasoningStep;
use crate::dream::seed::SeedGenerator;
use crate::dream::thought::{ReasoningMode, Session, SessionSummary, Thought};
use crate::error::{DreamError, Result};
use crate::memory::{MemoryStore, ThoughtStore};
use crate::output::{DreamEvent, EventBus};

/// Cooperative cancellation flag, observable between turns.
#[derive(Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    /// Terminal; a new session requires a fresh loop instance.
    Stopped,
}

pub struct SessionLoop {
    config: DreamConfig,
    seeder: SeedGenerator,
    step: ReasoningStep,
    scorer: InterestScorer,
    memory: MemoryStore,
    bus: Arc<EventBus>,
    stop: StopSignal,
    state: LoopState,
    session: Session,
}

impl SessionLoop {
    pub fn new(
        config: &DreamConfig,
        provider: Arc<dyn LanguageModel>,
        durable: Arc<dyn ThoughtStore>,
        bus: Arc<EventBus>,
        stop: StopSignal,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            seeder: SeedGenerator::new(&config.seeds)?,
            step: ReasoningStep::new(provider, &config.boundary),
            scorer: InterestScorer::new(&config.scoring),
            memory: MemoryStore::new(config.context_window, durable),
            bus,
            stop,
            state: LoopState::Idle,
            session: Session::start(),
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn session_id(&self) -> &str {
        &self.session.session_id
    }

    /// Drive the loop until a stop condition, then finalize the session.
    pub async fn run(&mut self) -> Result<SessionSummary> {
        if self.state != LoopState::Idle {
            return Err(DreamError::config(
                "session loop already ran; build a fresh instance",
            ));
        }
        self.state = LoopState::Running;

        let seed = self.seeder.next_seed();
        self.memory.prime(seed.clone());
        info!(session = %self.session.session_id, %seed, "dreaming session started");
        self.bus.publish(DreamEvent::SessionStarted {
            session_id: self.session.session_id.clone(),
            seed: seed.clone(),
        });

        let mut recorded: Vec<Thought> = Vec::new();
        let mut consecutive_failures = 0usize;
        let mut failure: Option<String> = None;

        while recorded.len() < self.config.max_thoughts {
            if self.stop.is_stopped() {
                info!("stop signal observed between turns");
                break;
            }

            let mode = select_mode(&self.config.mode_weights);
            let context = self.memory.context();
            match generate_with_retry(&self.step, mode, &context, &self.config.retry).await {
                Ok(content) => {
                    consecutive_failures = 0;
                    let verdict = self.scorer.score(&content);
                    let mut thought = Thought::new(
                        self.session.session_id.clone(),
                        mode,
                        content,
                        verdict.score,
                        verdict.is_gold,
                    );
                    if recorded.is_empty() {
                        thought = thought.with_seed(seed.clone());
                    }

                    if let Err(e) = self.memory.remember(&thought).await {
                        warn!("store write failed, aborting session: {}", e);
                        failure = Some(e.to_string());
                        break;
                    }

                    self.bus.publish(DreamEvent::ThoughtRecorded {
                        thought: thought.clone(),
                        agent: None,
                    });
                    if thought.is_gold {
                        self.bus.publish(DreamEvent::GoldStrike {
                            thought: thought.clone(),
                        });
                    }
                    recorded.push(thought);
                }
                Err(e @ DreamError::GenerationFailure(_)) => {
                    consecutive_failures += 1;
                    if consecutive_failures > self.config.generation_failure_cap {
                        warn!("generation failed {} turns in a row, stopping", consecutive_failures);
                        failure = Some(e.to_string());
                        break;
                    }
                    warn!("skipping turn after generation failure: {}", e);
                }
                Err(e) => {
                    warn!("unrecoverable boundary/store error, stopping: {}", e);
                    failure = Some(e.to_string());
                    break;
                }
            }

            self.pace().await;
        }

        self.state = LoopState::Stopped;
        self.session.close();
        let summary = SessionSummary::from_thoughts(self.session.clone(), &recorded, failure);
        info!(
            thoughts = summary.thought_count,
            gold = summary.gold_count,
            "dreaming session stopped"
        );
        self.bus.publish(DreamEvent::SessionEnded {
            summary: summary.clone(),
        });
        Ok(summary)
    }

    async fn pace(&self) {
        if self.config.pacing_secs > 0.0 && !self.stop.is_stopped() {
            sleep(Duration::from_secs_f64(self.config.pacing_secs)).await;
        }
    }
}

/// Bounded retry with doubling backoff, applied only to
/// `BoundaryUnavailable`. Other errors pass straight through.
pub(crate) async fn generate_with_retry(
    step: &ReasoningStep,
    mode: ReasoningMode,
    context: &[String],
    retry: &RetryConfig,
) -> Result<String> {
    let mut attempt = 0u32;
    loop {
        match step.generate(mode, context).await {
            Ok(content) => return Ok(content),
            Err(e) if e.is_retryable() && attempt < retry.max_retries => {
                let delay = retry.backoff_ms.saturating_mul(1 << attempt.min(16));
                warn!(
                    "boundary unavailable (attempt {}/{}), retrying in {}ms: {}",
                    attempt + 1,
                    retry.max_retries,
                    delay,
                    e
                );
                sleep(Duration::from_millis(delay)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
