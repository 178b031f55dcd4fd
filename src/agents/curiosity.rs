//! Curiosity gate: reacts to interrogative or curiosity markers in
//! emitted language and derives a search query from the trailing clause.
//!
//! The gate only ever reacts to what an agent actually said; it never
//! injects intent or forces a search.

use crate::error::{DreamError, Result};

const MAX_QUERY_WORDS: usize = 12;

pub struct CuriosityGate {
    markers: Vec<String>,
}

impl CuriosityGate {
    pub fn new(markers: &[String]) -> Result<Self> {
        if markers.is_empty() {
            return Err(DreamError::config(
                "curiosity marker set must not be empty",
            ));
        }
        Ok(Self {
            markers: markers.iter().map(|m| m.to_lowercase()).collect(),
        })
    }

    /// Inspect new content; when a marker is present, return the derived
    /// search query.
    pub fn inspect(&self, content: &str) -> Option<String> {
        let lower = content.to_lowercase();
        let triggered = lower.contains('?') || self.markers.iter().any(|m| lower.contains(m));
        if !triggered {
            return None;
        }
        let query = derive_query(content);
        if query.is_empty() {
            None
        } else {
            Some(query)
        }
    }
}

/// Take the trailing clause of the content and compact it into a query:
/// last sentence, punctuation stripped, capped at a dozen words.
fn derive_query(content: &str) -> String {
    let last_clause = content
        .split_terminator(['.', '?', '!', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .last()
        .unwrap_or("");

    let words: Vec<&str> = last_clause.split_whitespace().collect();
    let start = words.len().saturating_sub(MAX_QUERY_WORDS);
    words[start..]
        .join(" ")
        .chars()
        .filter(|c| !matches!(c, '"' | '\'' | ',' | ';' | ':' | '(' | ')'))
        .collect::<String>()
        .trim()
        .to_string()
}
