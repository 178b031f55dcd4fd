//! Markdown artifacts for gold thoughts and session summaries.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::dream::thought::{SessionSummary, Thought};

pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)
            .with_context(|| format!("cannot create output dir {}", output_dir.display()))?;
        Ok(Self { output_dir })
    }

    /// One dedicated file per gold strike.
    pub fn write_gold(&self, thought: &Thought) -> Result<PathBuf> {
        let stamp = thought.timestamp.format("%Y%m%d_%H%M%S");
        let path = self.output_dir.join(format!("golden_thought_{}.md", stamp));
        let body = format!(
            "# Golden Thought - {}\n\n\
             **Interest Score:** {:.2}\n\n\
             **Mode:** {}\n\n\
             **Content:**\n{}\n",
            thought.timestamp.format("%Y-%m-%d %H:%M:%S"),
            thought.interest_score,
            thought.mode,
            thought.content
        );
        std::fs::write(&path, body)
            .with_context(|| format!("cannot write {}", path.display()))?;
        info!("gold artifact saved to {}", path.display());
        Ok(path)
    }

    /// One summary file per completed session.
    pub fn write_summary(&self, summary: &SessionSummary) -> Result<PathBuf> {
        let stamp = summary.session.started_at.format("%Y%m%d_%H%M%S");
        let path = self.output_dir.join(format!("session_summary_{}.md", stamp));

        let mut body = format!(
            "# Dreaming Session Summary\n\n\
             **Session:** {}\n\
             **Duration:** {}s\n\
             **Total Thoughts:** {}\n\
             **Golden Discoveries:** {}\n\
             **Average Interest Score:** {:.2}\n",
            summary.session.session_id,
            summary.session.duration_secs(),
            summary.thought_count,
            summary.gold_count,
            summary.average_interest
        );
        if let Some(ref failure) = summary.failure {
            body.push_str(&format!("**Stopped on failure:** {}\n", failure));
        }
        if !summary.top_thoughts.is_empty() {
            body.push_str("\n## Most Interesting Thoughts\n");
            for (i, thought) in summary.top_thoughts.iter().enumerate() {
                let preview: String = thought.content.chars().take(200).collect();
                let ellipsis = if thought.content.chars().count() > 200 {
                    "..."
                } else {
                    ""
                };
                body.push_str(&format!(
                    "\n{}. **{}** (Score: {:.2})\n   {}{}\n",
                    i + 1,
                    thought.mode,
                    thought.interest_score,
                    preview,
                    ellipsis
                ));
            }
        }

        std::fs::write(&path, body)
            .with_context(|| format!("cannot write {}", path.display()))?;
        info!("session summary saved to {}", path.display());
        Ok(path)
    }
}
