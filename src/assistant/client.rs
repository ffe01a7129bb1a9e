//! Remote assistant-conversation service client

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::env;

use super::domain::{AssistantSpec, Run, RunStatus, ThreadMessage, ToolCall, ToolOutput};
use super::error::{ApiError, ApiResult};
use crate::config::AssistantSettings;

/// Outbound port for the hosted assistant-conversation service.
///
/// One implementation talks to the real service; tests substitute scripted
/// fakes. All identifiers are opaque server-assigned strings.
#[async_trait]
pub trait AssistantPort: Send + Sync {
    /// Register an assistant definition, returning its id
    async fn create_assistant(&self, spec: &AssistantSpec) -> ApiResult<String>;
    /// Create a conversation thread, returning its id
    async fn create_thread(&self) -> ApiResult<String>;
    /// Append a message to a thread
    async fn create_message(&self, thread_id: &str, role: &str, content: &str) -> ApiResult<()>;
    /// Start a run of the assistant against a thread
    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> ApiResult<Run>;
    /// Fetch a run's current state
    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> ApiResult<Run>;
    /// Submit tool outputs to resume a run waiting in requires_action
    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> ApiResult<Run>;
    /// List a thread's messages in the order the service returns them
    async fn list_messages(&self, thread_id: &str) -> ApiResult<Vec<ThreadMessage>>;
}

/// OpenAI Assistants API client (v2 wire shape)
pub struct OpenAiAssistantClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiAssistantClient {
    /// Create a new client from configuration
    pub fn new(config: &AssistantSettings) -> ApiResult<Self> {
        let api_key = env::var(&config.api_key_env).map_err(|_| {
            ApiError::Authentication(format!(
                "Environment variable {} not set",
                config.api_key_env
            ))
        })?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string());

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
        })
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> ApiResult<T> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("OpenAI-Beta", "assistants=v2")
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("OpenAI-Beta", "assistants=v2")
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parse(format!("Failed to parse response: {}", e)))
    }

    fn convert_run(run: ApiRun) -> Run {
        let pending_tool_calls = run
            .required_action
            .map(|action| {
                action
                    .submit_tool_outputs
                    .tool_calls
                    .into_iter()
                    .map(|tc| ToolCall {
                        id: tc.id,
                        name: tc.function.name,
                        arguments: tc.function.arguments,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Run {
            id: run.id,
            status: run.status,
            pending_tool_calls,
            last_error: run.last_error,
        }
    }
}

#[async_trait]
impl AssistantPort for OpenAiAssistantClient {
    async fn create_assistant(&self, spec: &AssistantSpec) -> ApiResult<String> {
        let body = json!({
            "model": spec.model,
            "instructions": spec.instructions,
            "tools": spec.tools.iter().map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    }
                })
            }).collect::<Vec<_>>(),
        });

        let created: CreatedObject = self.post_json("/assistants", &body).await?;
        tracing::debug!(assistant_id = %created.id, "assistant created");
        Ok(created.id)
    }

    async fn create_thread(&self) -> ApiResult<String> {
        let created: CreatedObject = self.post_json("/threads", &json!({})).await?;
        Ok(created.id)
    }

    async fn create_message(&self, thread_id: &str, role: &str, content: &str) -> ApiResult<()> {
        let body = json!({ "role": role, "content": content });
        let _: CreatedObject = self
            .post_json(&format!("/threads/{}/messages", thread_id), &body)
            .await?;
        Ok(())
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> ApiResult<Run> {
        let body = json!({ "assistant_id": assistant_id });
        let run: ApiRun = self
            .post_json(&format!("/threads/{}/runs", thread_id), &body)
            .await?;
        Ok(Self::convert_run(run))
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> ApiResult<Run> {
        let run: ApiRun = self
            .get_json(&format!("/threads/{}/runs/{}", thread_id, run_id))
            .await?;
        Ok(Self::convert_run(run))
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> ApiResult<Run> {
        let body = json!({ "tool_outputs": outputs });
        let run: ApiRun = self
            .post_json(
                &format!("/threads/{}/runs/{}/submit_tool_outputs", thread_id, run_id),
                &body,
            )
            .await?;
        Ok(Self::convert_run(run))
    }

    async fn list_messages(&self, thread_id: &str) -> ApiResult<Vec<ThreadMessage>> {
        let list: MessageList = self
            .get_json(&format!("/threads/{}/messages", thread_id))
            .await?;
        Ok(list.data)
    }
}

// Assistant API response types

#[derive(Debug, Deserialize)]
struct CreatedObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiRun {
    id: String,
    status: RunStatus,
    required_action: Option<ApiRequiredAction>,
    last_error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ApiRequiredAction {
    submit_tool_outputs: ApiSubmitToolOutputs,
}

#[derive(Debug, Deserialize)]
struct ApiSubmitToolOutputs {
    tool_calls: Vec<ApiToolCall>,
}

#[derive(Debug, Deserialize)]
struct ApiToolCall {
    id: String,
    function: ApiFunction,
}

#[derive(Debug, Deserialize)]
struct ApiFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<ThreadMessage>,
}
