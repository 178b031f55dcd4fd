//! Interest scoring and gold-strike classification.
//!
//! Deterministic: identical content and configuration always produce the
//! same score. The keyword lists come from configuration, not code.

use crate::config::ScoringConfig;

/// Outcome of scoring one piece of content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterestVerdict {
    pub score: f64,
    pub is_gold: bool,
}

pub struct InterestScorer {
    config: ScoringConfig,
}

impl InterestScorer {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Score content in [0, 1] and classify gold strikes.
    ///
    /// Gold is set when the composite exceeds the threshold OR any
    /// breakthrough keyword appears, independent of the score.
    pub fn score(&self, content: &str) -> InterestVerdict {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return InterestVerdict {
                score: 0.0,
                is_gold: false,
            };
        }

        let lower = trimmed.to_lowercase();

        let lexical = if self.config.discovery_keywords.is_empty() {
            0.0
        } else {
            let hits = self
                .config
                .discovery_keywords
                .iter()
                .filter(|k| lower.contains(k.to_lowercase().as_str()))
                .count();
            hits as f64 / self.config.discovery_keywords.len() as f64
        };

        let length = if self.config.length_saturation == 0 {
            0.0
        } else {
            (trimmed.chars().count() as f64 / self.config.length_saturation as f64).min(1.0)
        };

        // Each punctuation signal saturates at four marks.
        let questions = (trimmed.matches('?').count() as f64 * 0.25).min(1.0);
        let excitement = (trimmed.matches('!').count() as f64 * 0.25).min(1.0);

        let composite = self.config.lexical_weight * lexical
            + self.config.length_weight * length
            + self.config.question_weight * questions
            + self.config.excitement_weight * excitement;
        let score = composite.clamp(0.0, 1.0);

        let gold_lexical = self
            .config
            .gold_keywords
            .iter()
            .any(|k| lower.contains(k.to_lowercase().as_str()));

        InterestVerdict {
            score,
            is_gold: gold_lexical || score > self.config.gold_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> InterestScorer {
        InterestScorer::new(&ScoringConfig::default())
    }

    #[test]
    fn test_empty_content_scores_zero() {
        let verdict = scorer().score("");
        assert_eq!(verdict.score, 0.0);
        assert!(!verdict.is_gold);

        let verdict = scorer().score("   \n\t  ");
        assert_eq!(verdict.score, 0.0);
        assert!(!verdict.is_gold);
    }

    #[test]
    fn test_score_stays_in_unit_interval() {
        let loud = "breakthrough! eureka! pattern! connection! insight! ".repeat(50);
        let verdict = scorer().score(&loud);
        assert!(verdict.score >= 0.0 && verdict.score <= 1.0);
    }

    #[test]
    fn test_gold_keyword_forces_gold_regardless_of_score() {
        // Minimal content, negligible composite score.
        let verdict = scorer().score("a breakthrough insight");
        assert!(verdict.is_gold);
        assert!(verdict.score < 0.6);
    }

    #[test]
    fn test_high_composite_crosses_gold_threshold() {
        let content = format!(
            "What an unexpected connection! This surprising pattern reminds me of a paradox: \
             perhaps the insight here is a realization about understanding itself? \
             Fascinating and beautiful, an elegant discovery!? {}",
            "More development of the idea follows at length. ".repeat(8)
        );
        let verdict = scorer().score(&content);
        assert!(verdict.score > 0.6, "score was {}", verdict.score);
        assert!(verdict.is_gold);
    }

    #[test]
    fn test_plain_content_not_gold() {
        let verdict = scorer().score("The sky is blue today.");
        assert!(!verdict.is_gold);
        assert!(verdict.score < 0.4);
    }

    #[test]
    fn test_deterministic() {
        let content = "a fascinating pattern appears? perhaps!";
        let a = scorer().score(content);
        let b = scorer().score(content);
        assert_eq!(a, b);
    }

    #[test]
    fn test_length_signal_saturates() {
        let config = ScoringConfig {
            discovery_keywords: vec![],
            gold_keywords: vec![],
            ..ScoringConfig::default()
        };
        let scorer = InterestScorer::new(&config);
        let at_saturation = "x".repeat(400);
        let way_past = "x".repeat(4000);
        assert_eq!(
            scorer.score(&at_saturation).score,
            scorer.score(&way_past).score
        );
    }
}
