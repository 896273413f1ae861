//! News search tool: looks up recent articles on a news search API.
//!
//! The model calls this only for current events. Every failure (transport,
//! non-2xx status, undecodable body) is folded into the returned text so the
//! model can relay it; the tool itself never fails on upstream trouble.

use async_trait::async_trait;
use factquest_config::{MAX_ARTICLES, NewsConfig};
use factquest_core::error::ToolError;
use factquest_core::tool::{Tool, ToolResult};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Prefix of every error string the tool returns.
pub const ERROR_PREFIX: &str = "❌ News API error:";

pub struct NewsSearchTool {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    page_size: u32,
}

impl NewsSearchTool {
    /// `page_size` is capped at [`MAX_ARTICLES`].
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        page_size: u32,
        timeout: Duration,
    ) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "news_search".into(),
                reason: format!("HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
            page_size: page_size.clamp(1, MAX_ARTICLES),
        })
    }

    /// Build from the `[news]` config section.
    pub fn from_config(config: &NewsConfig, api_key: impl Into<String>) -> Result<Self, ToolError> {
        Self::new(
            config.api_url.as_str(),
            api_key,
            config.page_size,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Search and format the results. Errors come back as text.
    pub async fn search(&self, query: &str) -> Result<String, String> {
        let query = query.trim();
        debug!(query, "Searching news");

        let page_size = self.page_size.to_string();
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("q", query),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| format!("{ERROR_PREFIX} {}", e.without_url()))?;

        let body: NewsResponse = response
            .json()
            .await
            .map_err(|e| format!("{ERROR_PREFIX} {}", e.without_url()))?;

        let articles = body.articles.unwrap_or_default();
        Ok(format_articles(query, &articles, self.page_size as usize))
    }
}

#[async_trait]
impl Tool for NewsSearchTool {
    fn name(&self) -> &str {
        "news_search"
    }

    fn description(&self) -> &str {
        "Search recent news articles. Use only for current news, headlines, recent or \
         trending events, and ongoing real-world situations. Returns up to 5 articles as \
         markdown links with descriptions."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Keywords describing the news topic"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        let (success, output) = match self.search(query).await {
            Ok(text) => (true, text),
            Err(text) => {
                warn!(query, error = %text, "News search failed");
                (false, text)
            }
        };

        Ok(ToolResult {
            call_id: String::new(),
            success,
            output,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    articles: Option<Vec<Article>>,
}

#[derive(Debug, Default, Deserialize)]
struct Article {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// One `- [title](url): description` line per article, at most `limit`.
fn format_articles(query: &str, articles: &[Article], limit: usize) -> String {
    if articles.is_empty() {
        return format!("No news found for **{query}**.");
    }

    articles
        .iter()
        .take(limit)
        .map(|a| {
            format!(
                "- [{}]({}): {}",
                a.title.as_deref().unwrap_or("No Title"),
                a.url.as_deref().unwrap_or("#"),
                a.description.as_deref().unwrap_or(""),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
