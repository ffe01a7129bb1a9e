//! Tool registry and the web-search tool bridged to the assistant

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use super::domain::{ToolCall, ToolDefinition, ToolOutput};
use super::error::{QueryError, QueryResult};
use crate::domain::SearchPort;

/// Name of the web-search function declared on the assistant
pub const WEB_SEARCH_TOOL: &str = "tavily_search";

/// A function tool the assistant may call during a run
#[async_trait]
pub trait AssistantTool: Send + Sync {
    /// Definition declared on the assistant at registration time
    fn definition(&self) -> ToolDefinition;

    /// Resolve one call, given its JSON-encoded argument payload
    async fn invoke(&self, arguments: &str) -> QueryResult<String>;
}

/// Closed mapping of tool names to handlers.
///
/// Adding a tool is a registration, not a new dispatch branch. A call naming
/// a function outside the registry is an explicit error: leaving it
/// unanswered would stall the remote run in requires_action until it expires.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn AssistantTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its declared name
    pub fn register(&mut self, tool: Arc<dyn AssistantTool>) {
        self.tools.insert(tool.definition().name, tool);
    }

    /// Definitions of every registered tool, for assistant registration
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Resolve a batch of pending tool calls, sequentially and in input order.
    ///
    /// Each output is keyed by its originating call id. Any decode failure or
    /// unknown name aborts the batch; no partial result set is returned.
    pub async fn resolve(&self, calls: &[ToolCall]) -> QueryResult<Vec<ToolOutput>> {
        let mut outputs = Vec::with_capacity(calls.len());
        for call in calls {
            let tool = self
                .tools
                .get(&call.name)
                .ok_or_else(|| QueryError::UnknownTool(call.name.clone()))?;

            tracing::debug!(tool = %call.name, call_id = %call.id, "resolving tool call");
            let output = tool.invoke(&call.arguments).await?;
            outputs.push(ToolOutput {
                tool_call_id: call.id.clone(),
                output,
            });
        }
        Ok(outputs)
    }
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
}

/// Web-search tool backed by a [`SearchPort`] implementation
pub struct WebSearchTool {
    search: Arc<dyn SearchPort>,
}

impl WebSearchTool {
    pub fn new(search: Arc<dyn SearchPort>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl AssistantTool for WebSearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            WEB_SEARCH_TOOL,
            "Get information on recent events from the web.",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query to use. For example: 'Provide a competitive analysis of Open Source survey tools'"
                    }
                },
                "required": ["query"]
            }),
        )
    }

    async fn invoke(&self, arguments: &str) -> QueryResult<String> {
        let args: SearchArgs = serde_json::from_str(arguments).map_err(|e| {
            QueryError::ToolArguments(format!("Invalid {} arguments: {}", WEB_SEARCH_TOOL, e))
        })?;

        if args.query.trim().is_empty() {
            return Err(QueryError::ToolArguments(format!(
                "{} requires a non-empty query",
                WEB_SEARCH_TOOL
            )));
        }

        Ok(self.search.search_context(&args.query).await?)
    }
}
