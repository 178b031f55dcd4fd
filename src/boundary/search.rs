//! Web-search boundary.
//!
//! An opaque "query -> summarized text" collaborator. The DuckDuckGo HTML
//! endpoint needs no API key; results are scraped with small regexes and
//! summarized for transcript injection.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{DreamError, Result};

#[async_trait]
pub trait SearchBoundary: Send + Sync {
    /// Run one search and return a short summarized-results block.
    /// An empty string means the search ran but found nothing usable.
    async fn search(&self, query: &str) -> Result<String>;
}

pub struct DuckDuckGoSearch {
    client: Client,
    title_re: Regex,
    snippet_re: Regex,
    max_results: usize,
}

impl DuckDuckGoSearch {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36")
            .build()
            .map_err(|e| DreamError::config(format!("search client: {}", e)))?;
        let title_re = Regex::new(r#"class="result__a"[^>]*>([^<]+)"#)
            .map_err(|e| DreamError::config(e.to_string()))?;
        let snippet_re = Regex::new(r#"class="result__snippet"[^>]*>([^<]+)"#)
            .map_err(|e| DreamError::config(e.to_string()))?;
        Ok(Self {
            client,
            title_re,
            snippet_re,
            max_results: 3,
        })
    }

    fn summarize(&self, html: &str) -> String {
        let titles: Vec<_> = self.title_re.captures_iter(html).collect();
        let snippets: Vec<_> = self.snippet_re.captures_iter(html).collect();
        let count = titles.len().min(snippets.len()).min(self.max_results);

        let mut lines = Vec::with_capacity(count);
        for i in 0..count {
            let title = titles[i]
                .get(1)
                .map(|m| html_escape::decode_html_entities(m.as_str()).trim().to_string())
                .unwrap_or_default();
            let snippet = snippets[i]
                .get(1)
                .map(|m| html_escape::decode_html_entities(m.as_str()).trim().to_string())
                .unwrap_or_default();
            if !title.is_empty() && !snippet.is_empty() {
                lines.push(format!("{}. {}: {}", i + 1, title, snippet));
            }
        }
        lines.join("\n")
    }
}

#[async_trait]
impl SearchBoundary for DuckDuckGoSearch {
    async fn search(&self, query: &str) -> Result<String> {
        let url = format!(
            "https://html.duckduckgo.com/html/?q={}",
            urlencoding::encode(query)
        );
        debug!("searching: {}", query);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DreamError::boundary("duckduckgo", e))?;
        let html = response
            .text()
            .await
            .map_err(|e| DreamError::boundary("duckduckgo", e))?;

        let summary = self.summarize(&html);
        if summary.is_empty() {
            warn!("search returned no parseable results for '{}'", query);
        }
        Ok(summary)
    }
}
