//! Two-tier memory: a bounded short-term window feeding generation
//! context, and the durable append-only record sets behind it.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::debug;

use crate::dream::thought::Thought;
use crate::error::Result;
use crate::memory::sqlite::ThoughtStore;

/// Owns thoughts once stored. The short-term window lives in process
/// memory and resets each session; the durable tiers survive restart.
pub struct MemoryStore {
    window: VecDeque<String>,
    capacity: usize,
    durable: Arc<dyn ThoughtStore>,
}

impl MemoryStore {
    pub fn new(capacity: usize, durable: Arc<dyn ThoughtStore>) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            durable,
        }
    }

    /// Seed the context window without persisting; the seed is the first,
    /// unscored prompt of a session.
    pub fn prime(&mut self, seed: impl Into<String>) {
        self.push_window(seed.into());
    }

    /// Append a thought to the durable tiers and the short-term window.
    ///
    /// The durable append happens first: on `StoreWrite` the window is
    /// left untouched so memory never diverges from the persisted record.
    /// Gold placement is the store's concern; one append covers both
    /// record sets.
    pub async fn remember(&mut self, thought: &Thought) -> Result<()> {
        self.durable.append(thought).await?;
        if thought.is_gold {
            debug!(score = thought.interest_score, "gold strike recorded");
        }
        self.push_window(thought.content.clone());
        Ok(())
    }

    /// Current short-term window, oldest-to-newest.
    pub fn context(&self) -> Vec<String> {
        self.window.iter().cloned().collect()
    }

    /// Every gold thought ever stored, across sessions, in insertion order.
    pub async fn all_gold(&self) -> Result<Vec<Thought>> {
        self.durable.all_gold().await
    }

    pub fn durable(&self) -> Arc<dyn ThoughtStore> {
        self.durable.clone()
    }

    fn push_window(&mut self, content: String) {
        self.window.push_back(content);
        while self.window.len() > self.capacity {
            self.window.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dream::thought::ReasoningMode;
    use crate::error::DreamError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory store double; `fail_writes` simulates a durable failure.
    struct FakeStore {
        thoughts: Mutex<Vec<Thought>>,
        gold: Mutex<Vec<Thought>>,
        fail_writes: bool,
    }

    impl FakeStore {
        fn new(fail_writes: bool) -> Arc<Self> {
            Arc::new(Self {
                thoughts: Mutex::new(Vec::new()),
                gold: Mutex::new(Vec::new()),
                fail_writes,
            })
        }
    }

    #[async_trait]
    impl ThoughtStore for FakeStore {
        async fn append(&self, thought: &Thought) -> Result<()> {
            if self.fail_writes {
                return Err(DreamError::StoreWrite("disk full".into()));
            }
            self.thoughts.lock().unwrap().push(thought.clone());
            if thought.is_gold {
                self.gold.lock().unwrap().push(thought.clone());
            }
            Ok(())
        }
        async fn all_thoughts(&self) -> Result<Vec<Thought>> {
            Ok(self.thoughts.lock().unwrap().clone())
        }
        async fn all_gold(&self) -> Result<Vec<Thought>> {
            Ok(self.gold.lock().unwrap().clone())
        }
        async fn session_thoughts(&self, session_id: &str) -> Result<Vec<Thought>> {
            Ok(self
                .thoughts
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.session_id == session_id)
                .cloned()
                .collect())
        }
        async fn count(&self) -> Result<usize> {
            Ok(self.thoughts.lock().unwrap().len())
        }
    }

    fn thought(content: &str, gold: bool) -> Thought {
        Thought::new("s", ReasoningMode::FreeAssociation, content, 0.3, gold)
    }

    #[tokio::test]
    async fn test_window_evicts_oldest_beyond_capacity() {
        let mut memory = MemoryStore::new(3, FakeStore::new(false));
        for i in 0..7 {
            memory.remember(&thought(&format!("t{}", i), false)).await.unwrap();
        }
        assert_eq!(memory.context(), vec!["t4", "t5", "t6"]);
    }

    #[tokio::test]
    async fn test_context_empty_at_start() {
        let memory = MemoryStore::new(5, FakeStore::new(false));
        assert!(memory.context().is_empty());
    }

    #[tokio::test]
    async fn test_gold_lands_in_both_tiers() {
        let store = FakeStore::new(false);
        let mut memory = MemoryStore::new(5, store.clone());
        memory.remember(&thought("plain", false)).await.unwrap();
        memory.remember(&thought("shiny", true)).await.unwrap();

        assert_eq!(store.all_thoughts().await.unwrap().len(), 2);
        let gold = memory.all_gold().await.unwrap();
        assert_eq!(gold.len(), 1);
        assert_eq!(gold[0].content, "shiny");
    }

    #[tokio::test]
    async fn test_failed_write_leaves_window_untouched() {
        let mut memory = MemoryStore::new(5, FakeStore::new(true));
        let result = memory.remember(&thought("lost", false)).await;
        assert!(matches!(result, Err(DreamError::StoreWrite(_))));
        assert!(memory.context().is_empty());
    }

    #[tokio::test]
    async fn test_prime_feeds_context_without_persisting() {
        let store = FakeStore::new(false);
        let mut memory = MemoryStore::new(5, store.clone());
        memory.prime("ocean + infinity");
        assert_eq!(memory.context(), vec!["ocean + infinity"]);
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
