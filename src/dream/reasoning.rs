//! One generation turn: mode instruction + short-term context in, one
//! trimmed thought out. Exactly one boundary call per invocation; retry
//! policy belongs to the caller.

use std::sync::Arc;

use rand::Rng;

use crate::boundary::{CompletionOptions, LanguageModel};
use crate::config::BoundaryConfig;
use crate::dream::thought::ReasoningMode;
use crate::error::{DreamError, Result};

pub struct ReasoningStep {
    provider: Arc<dyn LanguageModel>,
    model: String,
    creativity_min: f64,
    creativity_max: f64,
}

impl ReasoningStep {
    pub fn new(provider: Arc<dyn LanguageModel>, boundary: &BoundaryConfig) -> Self {
        Self {
            provider,
            model: boundary.model.clone(),
            creativity_min: boundary.creativity_min,
            creativity_max: boundary.creativity_max,
        }
    }

    /// Generate the next thought from the current context window
    /// (oldest-to-newest). Empty output is a `GenerationFailure`.
    pub async fn generate(&self, mode: ReasoningMode, context: &[String]) -> Result<String> {
        let prompt = build_prompt(mode, context);
        let options = CompletionOptions {
            model: self.model.clone(),
            temperature: self.draw_temperature(),
        };

        let raw = self.provider.complete(&prompt, &options).await?;
        let content = trim_artifacts(&raw);
        if content.is_empty() {
            return Err(DreamError::GenerationFailure(
                "boundary returned empty text".to_string(),
            ));
        }
        Ok(content)
    }

    /// Temperature varies per call within the configured creativity band.
    fn draw_temperature(&self) -> f64 {
        if self.creativity_max > self.creativity_min {
            rand::thread_rng().gen_range(self.creativity_min..self.creativity_max)
        } else {
            self.creativity_min
        }
    }
}

fn build_prompt(mode: ReasoningMode, context: &[String]) -> String {
    if context.is_empty() {
        return mode.instruction().to_string();
    }
    let history = context
        .iter()
        .map(|c| format!("- {}", c))
        .collect::<Vec<_>>()
        .join("\n");
    format!("Previous thoughts:\n{}\n\n{}", history, mode.instruction())
}

/// Strip structural artifacts models wrap around plain text.
fn trim_artifacts(raw: &str) -> String {
    let mut text = raw.trim();
    for fence in ["```text", "```markdown", "```"] {
        text = text.strip_prefix(fence).unwrap_or(text);
    }
    text = text.strip_suffix("```").unwrap_or(text);
    let text = text.trim();
    // Drop one layer of wrapping quotes.
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        text[1..text.len() - 1].trim().to_string()
    } else {
        text.to_string()
    }
}
