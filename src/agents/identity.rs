//! Agent identities for the multi-agent variant.
//!
//! Identities are presentation-only: trait tags color the display label
//! but carry no behavioral weight in the generation call beyond turn
//! attribution.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dream::thought::Thought;

/// Reserved id for the synthetic turn that injects search results.
pub const SEARCH_AGENT_ID: &str = "search";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentIdentity {
    pub agent_id: String,
    pub display_label: String,
    pub trait_tags: Vec<String>,
}

impl AgentIdentity {
    /// The pseudo-agent that search results are attributed to.
    pub fn search_results() -> Self {
        Self {
            agent_id: SEARCH_AGENT_ID.to_string(),
            display_label: "Search Results".to_string(),
            trait_tags: Vec::new(),
        }
    }
}

/// One entry of the shared transcript. Append-only, ordered by
/// `turn_index`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub turn_index: usize,
    pub agent_id: String,
    pub thought: Thought,
    pub triggered_search: bool,
}

const TRAIT_POOL: &[&str] = &[
    "curious",
    "analytical",
    "creative",
    "methodical",
    "intuitive",
    "skeptical",
    "optimistic",
    "philosophical",
    "practical",
    "imaginative",
    "logical",
    "empathetic",
    "bold",
    "cautious",
    "innovative",
];

fn label_prefix(primary_trait: &str) -> &'static str {
    match primary_trait {
        "curious" => "Explorer",
        "analytical" => "Analyzer",
        "creative" => "Dreamer",
        "methodical" => "Builder",
        "intuitive" => "Seer",
        "skeptical" => "Questioner",
        "optimistic" => "Visionary",
        "philosophical" => "Thinker",
        "practical" => "Maker",
        "imaginative" => "Weaver",
        "logical" => "Reasoner",
        "empathetic" => "Connector",
        "bold" => "Pioneer",
        "cautious" => "Guardian",
        "innovative" => "Inventor",
        _ => "Agent",
    }
}

/// Generate a roster of distinct agent identities.
pub fn generate_roster(count: usize) -> Vec<AgentIdentity> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let id = Uuid::new_v4().to_string();
            let trait_count = rng.gen_range(2..=4).min(TRAIT_POOL.len());
            let traits: Vec<String> = TRAIT_POOL
                .choose_multiple(&mut rng, trait_count)
                .map(|t| t.to_string())
                .collect();
            let suffix: String = id.chars().rev().take(3).collect();
            AgentIdentity {
                display_label: format!("{}-{}", label_prefix(&traits[0]), suffix),
                agent_id: id,
                trait_tags: traits,
            }
        })
        .collect()
}
