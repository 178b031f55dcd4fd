//! Reverie - autonomous reasoning console
//!
//! Interactive front-end for the dreaming pipeline: start single-agent
//! sessions, run multi-agent conversations, and review golden thoughts.

use anyhow::Result;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use reverie::agents::TurnOrchestrator;
use reverie::boundary::{build_provider, DuckDuckGoSearch, SearchBoundary};
use reverie::config::DreamConfig;
use reverie::dream::{SessionLoop, StopSignal};
use reverie::memory::{SqliteThoughtStore, ThoughtStore};
use reverie::output::artifacts::ArtifactWriter;
use reverie::output::console::ConsoleReporter;
use reverie::output::EventBus;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reverie=info")),
        )
        .with_target(false)
        .init();

    println!("\n{}", "═".repeat(60));
    println!("🧠 Reverie - Autonomous Reasoning System");
    println!("{}\n", "═".repeat(60));

    let config = DreamConfig::load("dream_config.json")?;
    let provider = build_provider(&config.boundary)?;
    let store: Arc<dyn ThoughtStore> = Arc::new(SqliteThoughtStore::new(&config.db_path).await?);
    info!(
        "memory initialized with {} stored thoughts",
        store.count().await?
    );

    let bus = Arc::new(EventBus::new());
    let artifacts = ArtifactWriter::new(&config.output_dir)?;
    let reporter = ConsoleReporter::new(config.scoring.interest_threshold, Some(artifacts));
    reporter.spawn(bus.subscribe());

    println!("Commands: 'start' | 'agents' | 'golden' | 'quit'\n");

    loop {
        print!("💤 reverie> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let command = input.trim().to_lowercase();

        match command.as_str() {
            "" => continue,
            "quit" | "exit" | "q" => {
                println!("\n👋 Goodbye! Sweet dreams...\n");
                break;
            }
            "start" => {
                let stop = StopSignal::new();
                let watcher = spawn_interrupt_watcher(stop.clone());
                println!("Press Ctrl+C to stop dreaming\n");

                let mut session = SessionLoop::new(
                    &config,
                    provider.clone(),
                    store.clone(),
                    bus.clone(),
                    stop,
                )?;
                if let Err(e) = session.run().await {
                    println!("❌ Session error: {}\n", e);
                }
                watcher.abort();
            }
            "agents" => {
                let stop = StopSignal::new();
                let watcher = spawn_interrupt_watcher(stop.clone());
                println!("Press Ctrl+C to end the conversation\n");

                let search: Arc<dyn SearchBoundary> = Arc::new(DuckDuckGoSearch::new()?);
                let mut orchestrator = TurnOrchestrator::new(
                    &config,
                    provider.clone(),
                    store.clone(),
                    Some(search),
                    bus.clone(),
                    stop,
                )?;
                for agent in orchestrator.roster() {
                    println!(
                        "🤖 {} ({})",
                        agent.display_label,
                        agent.trait_tags.join(", ")
                    );
                }
                println!();
                if let Err(e) = orchestrator.run().await {
                    println!("❌ Conversation error: {}\n", e);
                }
                watcher.abort();
            }
            "golden" => {
                let gold = store.all_gold().await?;
                if gold.is_empty() {
                    println!("No golden thoughts discovered yet. Keep dreaming!\n");
                    continue;
                }
                println!("\n✨ {} Golden Thoughts Discovered:\n", gold.len());
                for (i, thought) in gold.iter().enumerate() {
                    println!(
                        "{}. [{}] Score {:.2} ({})",
                        i + 1,
                        thought.timestamp.format("%Y-%m-%d %H:%M:%S"),
                        thought.interest_score,
                        thought.mode
                    );
                    println!("   {}\n", thought.content);
                }
            }
            _ => println!("Unknown command. Try 'start', 'agents', 'golden', or 'quit'.\n"),
        }
    }

    Ok(())
}

/// Translate Ctrl+C into a cooperative stop; the in-flight boundary call
/// finishes before the loop transitions to Stopped.
fn spawn_interrupt_watcher(stop: StopSignal) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\n🌅 Stop requested; finishing the current turn...");
            stop.stop();
        }
    })
}
