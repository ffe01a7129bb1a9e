//! Tavily web-search adapter

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;

use crate::assistant::error::{ApiError, ApiResult};
use crate::config::SearchSettings;
use crate::domain::SearchPort;

/// Tavily search client.
///
/// Issues one search per call and returns the retrieved sources as an opaque
/// context blob: a JSON array of `{url, content}` entries, truncated to the
/// configured token budget.
pub struct TavilyClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    search_depth: String,
    max_context_tokens: u32,
}

impl TavilyClient {
    /// Create a new client from configuration
    pub fn new(config: &SearchSettings) -> ApiResult<Self> {
        let api_key = env::var(&config.api_key_env).map_err(|_| {
            ApiError::Authentication(format!(
                "Environment variable {} not set",
                config.api_key_env
            ))
        })?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.tavily.com".to_string());

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
            search_depth: config.search_depth.clone(),
            max_context_tokens: config.max_context_tokens,
        })
    }
}

#[async_trait]
impl SearchPort for TavilyClient {
    async fn search_context(&self, query: &str) -> ApiResult<String> {
        let body = serde_json::json!({
            "api_key": self.api_key,
            "query": query,
            "search_depth": self.search_depth,
        });

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let search: TavilyResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(format!("Failed to parse response: {}", e)))?;

        tracing::debug!(results = search.results.len(), "search returned");

        let sources = apply_context_budget(search.results, self.max_context_tokens);
        serde_json::to_string(&sources)
            .map_err(|e| ApiError::Parse(format!("Failed to encode context: {}", e)))
    }
}

/// Keep sources in ranking order until the approximate token budget is spent.
/// Token count is approximated at 4 characters per token.
fn apply_context_budget(results: Vec<SearchSource>, max_tokens: u32) -> Vec<SearchSource> {
    let budget_chars = max_tokens as usize * 4;
    let mut used = 0usize;
    let mut kept = Vec::new();

    for source in results {
        let cost = source.url.len() + source.content.len();
        if !kept.is_empty() && used + cost > budget_chars {
            break;
        }
        used += cost;
        kept.push(source);
    }

    kept
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<SearchSource>,
}

/// One retrieved source, passed through to the tool output verbatim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSource {
    pub url: String,
    pub content: String,
}
