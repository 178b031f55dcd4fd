//! Console reporter: renders the live event stream and writes artifacts.
//!
//! Runs as a detached read-only observer; errors here never reach the
//! writing loop.

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::dream::thought::Thought;
use crate::output::artifacts::ArtifactWriter;
use crate::output::DreamEvent;

pub struct ConsoleReporter {
    /// Score above which a thought gets the "interesting" tier.
    interest_threshold: f64,
    artifacts: Option<ArtifactWriter>,
}

impl ConsoleReporter {
    pub fn new(interest_threshold: f64, artifacts: Option<ArtifactWriter>) -> Self {
        Self {
            interest_threshold,
            artifacts,
        }
    }

    /// Consume events until the bus closes.
    pub fn spawn(self, mut rx: Receiver<DreamEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => self.render(event),
                    Err(RecvError::Lagged(missed)) => {
                        warn!("console reporter lagged, {} events dropped", missed);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    fn render(&self, event: DreamEvent) {
        match event {
            DreamEvent::SessionStarted { seed, .. } => {
                println!("\n🌙 Dreaming session started");
                println!("   Seed: {}\n", seed);
            }
            DreamEvent::ThoughtRecorded { thought, agent } => {
                self.render_thought(&thought, agent.as_deref());
            }
            DreamEvent::GoldStrike { thought } => {
                if let Some(ref artifacts) = self.artifacts {
                    if let Err(e) = artifacts.write_gold(&thought) {
                        warn!("failed to write gold artifact: {:#}", e);
                    }
                }
            }
            DreamEvent::CuriosityTriggered {
                agent,
                query,
                injected,
            } => {
                if injected {
                    println!("🔍 [{}] searched: {}", agent, query);
                } else {
                    println!("🔍 [{}] curious about: {} (no search boundary)", agent, query);
                }
            }
            DreamEvent::SessionEnded { summary } => {
                println!(
                    "\n🌅 Session complete: {} thoughts, {} gold, avg interest {:.2}",
                    summary.thought_count, summary.gold_count, summary.average_interest
                );
                if let Some(ref failure) = summary.failure {
                    println!("⚠️  Stopped on failure: {}", failure);
                }
                if let Some(ref artifacts) = self.artifacts {
                    if let Err(e) = artifacts.write_summary(&summary) {
                        warn!("failed to write session summary: {:#}", e);
                    }
                }
            }
        }
    }

    fn render_thought(&self, thought: &Thought, agent: Option<&str>) {
        let stamp = thought.timestamp.format("%H:%M:%S");
        let speaker = agent.map(|a| format!("{} | ", a)).unwrap_or_default();
        if thought.is_gold {
            println!(
                "\n🌟 [{}] {}{} (Score: {:.2})",
                stamp, speaker, thought.mode, thought.interest_score
            );
            println!("✨ {}", thought.content);
            println!("{}", "=".repeat(60));
        } else if thought.interest_score > self.interest_threshold {
            println!(
                "\n💡 [{}] {}{} (Score: {:.2})",
                stamp, speaker, thought.mode, thought.interest_score
            );
            println!("   {}", thought.content);
        } else {
            println!("\n💭 [{}] {}{}", stamp, speaker, thought.mode);
            println!("   {}", thought.content);
        }
    }
}
