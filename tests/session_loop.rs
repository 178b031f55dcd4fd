use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use reverie::boundary::{CompletionOptions, LanguageModel};
use reverie::config::DreamConfig;
use reverie::dream::{LoopState, SessionLoop, StopSignal, Thought};
use reverie::error::{DreamError, Result as DreamResult};
use reverie::memory::ThoughtStore;
use reverie::output::EventBus;

// --- Mocks ---

/// Plays back a script of replies, then repeats the last entry forever.
struct ScriptedModel {
    script: Mutex<VecDeque<DreamResult<String>>>,
    fallback: String,
    calls: AtomicUsize,
}

impl ScriptedModel {
    fn new(script: Vec<DreamResult<String>>) -> Arc<Self> {
        Self::with_fallback(script, "The tide keeps returning to the same shore.")
    }

    fn always(reply: &str) -> Arc<Self> {
        Self::with_fallback(vec![], reply)
    }

    fn with_fallback(script: Vec<DreamResult<String>>, fallback: &str) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback: fallback.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, _prompt: &str, _options: &CompletionOptions) -> DreamResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().unwrap().pop_front() {
            Some(reply) => reply,
            None => Ok(self.fallback.clone()),
        }
    }

    fn endpoint(&self) -> &str {
        "mock"
    }
}

struct RecordingStore {
    thoughts: Mutex<Vec<Thought>>,
    gold: Mutex<Vec<Thought>>,
    fail_writes: bool,
}

impl RecordingStore {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            thoughts: Mutex::new(vec![]),
            gold: Mutex::new(vec![]),
            fail_writes: false,
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            thoughts: Mutex::new(vec![]),
            gold: Mutex::new(vec![]),
            fail_writes: true,
        })
    }
}

#[async_trait]
impl ThoughtStore for RecordingStore {
    async fn append(&self, thought: &Thought) -> DreamResult<()> {
        if self.fail_writes {
            return Err(DreamError::StoreWrite("disk full".to_string()));
        }
        self.thoughts.lock().unwrap().push(thought.clone());
        if thought.is_gold {
            self.gold.lock().unwrap().push(thought.clone());
        }
        Ok(())
    }

    async fn all_thoughts(&self) -> DreamResult<Vec<Thought>> {
        Ok(self.thoughts.lock().unwrap().clone())
    }

    async fn all_gold(&self) -> DreamResult<Vec<Thought>> {
        Ok(self.gold.lock().unwrap().clone())
    }

    async fn session_thoughts(&self, session_id: &str) -> DreamResult<Vec<Thought>> {
        Ok(self
            .thoughts
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn count(&self) -> DreamResult<usize> {
        Ok(self.thoughts.lock().unwrap().len())
    }
}

fn test_config(max_thoughts: usize) -> DreamConfig {
    let mut config = DreamConfig::default();
    config.max_thoughts = max_thoughts;
    config.pacing_secs = 0.0;
    config.retry.max_retries = 2;
    config.retry.backoff_ms = 1;
    config
}

fn unavailable() -> DreamError {
    DreamError::boundary("mock", "connection refused")
}

// --- Tests ---

#[tokio::test]
async fn test_session_stops_after_max_thoughts() {
    let model = ScriptedModel::always("A quiet thought about rivers.");
    let store = RecordingStore::new();
    let mut session = SessionLoop::new(
        &test_config(5),
        model.clone(),
        store.clone(),
        Arc::new(EventBus::new()),
        StopSignal::new(),
    )
    .unwrap();

    let summary = session.run().await.unwrap();

    assert_eq!(session.state(), LoopState::Stopped);
    assert_eq!(summary.thought_count, 5);
    assert!(summary.failure.is_none());
    assert_eq!(model.calls(), 5);
    assert_eq!(store.all_thoughts().await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_only_first_thought_carries_the_seed() {
    let model = ScriptedModel::always("Mountains forget their own height.");
    let store = RecordingStore::new();
    let mut session = SessionLoop::new(
        &test_config(3),
        model,
        store.clone(),
        Arc::new(EventBus::new()),
        StopSignal::new(),
    )
    .unwrap();
    session.run().await.unwrap();

    let recorded = store.all_thoughts().await.unwrap();
    assert!(recorded[0].seed_text.is_some());
    assert!(recorded[1..].iter().all(|t| t.seed_text.is_none()));
}

#[tokio::test]
async fn test_boundary_unavailable_exhausts_retries_then_aborts() {
    let model = ScriptedModel::new(vec![
        Err(unavailable()),
        Err(unavailable()),
        Err(unavailable()),
        Ok("never reached".to_string()),
    ]);
    // Pin the script so the fallback never kicks in before retries run out.
    let config = test_config(10);
    assert_eq!(config.retry.max_retries, 2);

    let store = RecordingStore::new();
    let mut session = SessionLoop::new(
        &config,
        model.clone(),
        store.clone(),
        Arc::new(EventBus::new()),
        StopSignal::new(),
    )
    .unwrap();
    let summary = session.run().await.unwrap();

    // One initial attempt plus two retries, then the loop gives up.
    assert_eq!(model.calls(), 3);
    assert_eq!(summary.thought_count, 0);
    assert!(summary.failure.is_some());
    assert_eq!(session.state(), LoopState::Stopped);
}

#[tokio::test]
async fn test_generation_failures_skip_turns_until_the_cap() {
    let failure = || Err(DreamError::GenerationFailure("empty text".to_string()));
    let model = ScriptedModel::new(vec![
        failure(),
        Ok("A thought that lands.".to_string()),
        failure(),
        failure(),
        failure(),
    ]);
    let store = RecordingStore::new();
    let mut session = SessionLoop::new(
        &test_config(10),
        model,
        store.clone(),
        Arc::new(EventBus::new()),
        StopSignal::new(),
    )
    .unwrap();
    let summary = session.run().await.unwrap();

    // One failure is skipped, the success resets the streak, three in a
    // row exceed the cap of two and abort the session.
    assert_eq!(summary.thought_count, 1);
    assert!(summary.failure.is_some());
    assert_eq!(store.all_thoughts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_pre_set_stop_signal_halts_before_any_turn() {
    let model = ScriptedModel::always("unused");
    let stop = StopSignal::new();
    stop.stop();

    let mut session = SessionLoop::new(
        &test_config(10),
        model.clone(),
        RecordingStore::new(),
        Arc::new(EventBus::new()),
        stop,
    )
    .unwrap();
    let summary = session.run().await.unwrap();

    assert_eq!(model.calls(), 0);
    assert_eq!(summary.thought_count, 0);
    assert!(summary.failure.is_none());
    assert_eq!(session.state(), LoopState::Stopped);
}

#[tokio::test]
async fn test_store_write_failure_aborts_immediately() {
    let model = ScriptedModel::always("A thought nobody will keep.");
    let mut session = SessionLoop::new(
        &test_config(10),
        model.clone(),
        RecordingStore::failing(),
        Arc::new(EventBus::new()),
        StopSignal::new(),
    )
    .unwrap();
    let summary = session.run().await.unwrap();

    assert_eq!(model.calls(), 1);
    assert_eq!(summary.thought_count, 0);
    assert!(summary.failure.is_some());
}

#[tokio::test]
async fn test_gold_thoughts_land_in_both_record_sets() {
    let model = ScriptedModel::always(
        "Suddenly clear: a breakthrough in how patterns connect across scales.",
    );
    let store = RecordingStore::new();
    let mut session = SessionLoop::new(
        &test_config(2),
        model,
        store.clone(),
        Arc::new(EventBus::new()),
        StopSignal::new(),
    )
    .unwrap();
    let summary = session.run().await.unwrap();

    assert_eq!(summary.gold_count, 2);
    assert_eq!(store.all_gold().await.unwrap().len(), 2);
    assert_eq!(store.all_thoughts().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_finished_loop_rejects_rerun() {
    let model = ScriptedModel::always("One and done.");
    let mut session = SessionLoop::new(
        &test_config(1),
        model,
        RecordingStore::new(),
        Arc::new(EventBus::new()),
        StopSignal::new(),
    )
    .unwrap();
    session.run().await.unwrap();

    let err = session.run().await.unwrap_err();
    assert!(matches!(err, DreamError::Configuration(_)));
}
