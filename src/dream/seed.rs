//! Seed generation for session openings.
//!
//! Draws from three disjoint families: a random concept pairing, an
//! open-ended question, or a seed synthesized from the wall clock. Pure
//! sampling, no side effects; empty pools are rejected at construction.

use chrono::Local;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::SeedConfig;
use crate::error::{DreamError, Result};

pub struct SeedGenerator {
    concepts: Vec<String>,
    questions: Vec<String>,
}

impl SeedGenerator {
    pub fn new(seeds: &SeedConfig) -> Result<Self> {
        if seeds.concepts.len() < 2 {
            return Err(DreamError::config(
                "seed concept pool needs at least two entries",
            ));
        }
        if seeds.questions.is_empty() {
            return Err(DreamError::config("seed question pool must not be empty"));
        }
        Ok(Self {
            concepts: seeds.concepts.clone(),
            questions: seeds.questions.clone(),
        })
    }

    /// Produce the first prompt of a session. Always succeeds.
    pub fn next_seed(&self) -> String {
        let mut rng = rand::thread_rng();
        match rng.gen_range(0..3) {
            0 => self.combination_seed(&mut rng),
            1 => self
                .questions
                .choose(&mut rng)
                .expect("question pool validated non-empty")
                .clone(),
            _ => self.clock_seed(&mut rng),
        }
    }

    /// Two distinct concepts drawn without replacement, combined "A + B".
    fn combination_seed(&self, rng: &mut impl Rng) -> String {
        let mut picks = self.concepts.choose_multiple(rng, 2);
        let a = picks.next().expect("concept pool validated");
        let b = picks.next().expect("concept pool validated");
        format!("{} + {}", a, b)
    }

    fn clock_seed(&self, rng: &mut impl Rng) -> String {
        let now = Local::now();
        let templates = [
            format!(
                "It's {} on a {}. What might be happening right now?",
                now.format("%H:%M"),
                now.format("%A")
            ),
            format!(
                "In this moment at {}, what thoughts arise?",
                now.format("%H:%M")
            ),
            format!(
                "The time is {}. What does this precise moment contain?",
                now.format("%H:%M:%S")
            ),
        ];
        templates
            .choose(rng)
            .expect("template list is non-empty")
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeedConfig;

    #[test]
    fn test_rejects_empty_pools() {
        let empty = SeedConfig {
            concepts: vec![],
            questions: vec!["q".into()],
        };
        assert!(SeedGenerator::new(&empty).is_err());

        let no_questions = SeedConfig {
            concepts: vec!["a".into(), "b".into()],
            questions: vec![],
        };
        assert!(SeedGenerator::new(&no_questions).is_err());
    }

    #[test]
    fn test_combination_uses_distinct_concepts() {
        let seeds = SeedConfig {
            concepts: vec!["fire".into(), "ice".into()],
            questions: vec!["q".into()],
        };
        let gen = SeedGenerator::new(&seeds).unwrap();
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let seed = gen.combination_seed(&mut rng);
            assert!(seed == "fire + ice" || seed == "ice + fire");
        }
    }

    #[test]
    fn test_next_seed_never_empty() {
        let gen = SeedGenerator::new(&SeedConfig::default()).unwrap();
        for _ in 0..100 {
            assert!(!gen.next_seed().is_empty());
        }
    }
}
