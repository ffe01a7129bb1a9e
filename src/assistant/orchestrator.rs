//! Run orchestration: drives one remote conversation turn from creation
//! through tool-call resolution to final transcript retrieval.

use backoff::ExponentialBackoff;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::client::AssistantPort;
use super::domain::{flatten_messages, AssistantSpec, Run, RunStatus, TranscriptEntry};
use super::error::{QueryError, QueryResult};
use super::tools::ToolRegistry;
use crate::config::{AssistantSettings, PollSettings};

/// Register the fixed assistant definition with the remote service.
///
/// Called once at startup; the returned id is injected into the orchestrator
/// so every run uses the same instructions, model, and declared tools.
pub async fn register_assistant(
    api: &dyn AssistantPort,
    config: &AssistantSettings,
    tools: &ToolRegistry,
) -> QueryResult<String> {
    let spec = AssistantSpec {
        model: config.model.clone(),
        instructions: config.instructions.clone(),
        tools: tools.definitions(),
    };
    Ok(api.create_assistant(&spec).await?)
}

/// Drives a remote run for one query.
///
/// The remote service owns the actual state machine; the orchestrator's job
/// is to keep polling and to bridge tool calls. Within one query the flow is
/// strictly sequential: message creation happens before run creation, run
/// creation before polling, polling before tool resolution, and the final
/// transcript read happens only after the run completes.
pub struct RunOrchestrator {
    api: Arc<dyn AssistantPort>,
    tools: ToolRegistry,
    assistant_id: String,
    poll: PollSettings,
}

impl RunOrchestrator {
    pub fn new(
        api: Arc<dyn AssistantPort>,
        tools: ToolRegistry,
        assistant_id: String,
        poll: PollSettings,
    ) -> Self {
        Self {
            api,
            tools,
            assistant_id,
            poll,
        }
    }

    /// Run one conversation turn and return the flattened transcript.
    ///
    /// Creates a thread, posts the user message, starts a run, waits for it
    /// to settle, resolves tool calls as the run requests them, and reads the
    /// thread back once the run completes. A failed run surfaces its error
    /// payload without reading messages.
    pub async fn run_query(&self, input: &str) -> QueryResult<Vec<TranscriptEntry>> {
        let thread_id = self.api.create_thread().await?;
        debug!(%thread_id, "thread created");

        self.api.create_message(&thread_id, "user", input).await?;

        let mut run = self.api.create_run(&thread_id, &self.assistant_id).await?;
        info!(%thread_id, run_id = %run.id, "run started");

        loop {
            run = self.wait_until_settled(&thread_id, &run.id).await?;

            match run.status {
                RunStatus::Completed => break,
                RunStatus::Failed => {
                    warn!(%thread_id, run_id = %run.id, "run failed");
                    return Err(QueryError::RunFailed(
                        run.last_error.unwrap_or(serde_json::Value::Null),
                    ));
                }
                RunStatus::RequiresAction => {
                    debug!(
                        run_id = %run.id,
                        pending = run.pending_tool_calls.len(),
                        "resolving tool calls"
                    );
                    let outputs = self.tools.resolve(&run.pending_tool_calls).await?;
                    run = self
                        .api
                        .submit_tool_outputs(&thread_id, &run.id, &outputs)
                        .await?;
                }
                status => {
                    return Err(QueryError::Internal(format!(
                        "poll settled on unexpected status {}",
                        status
                    )));
                }
            }
        }

        let messages = self.api.list_messages(&thread_id).await?;
        Ok(flatten_messages(&messages))
    }

    /// Poll the run until it settles, under exponential backoff and a hard
    /// deadline. Deadline expiry surfaces as a timeout error; upstream
    /// failures abort immediately.
    async fn wait_until_settled(&self, thread_id: &str, run_id: &str) -> QueryResult<Run> {
        let deadline_secs = self.poll.deadline_secs;
        let policy = ExponentialBackoff {
            initial_interval: Duration::from_millis(self.poll.interval_ms),
            max_interval: Duration::from_millis(self.poll.max_interval_ms),
            max_elapsed_time: Some(Duration::from_secs(deadline_secs)),
            ..ExponentialBackoff::default()
        };

        backoff::future::retry(policy, || {
            let api = Arc::clone(&self.api);
            let thread_id = thread_id.to_string();
            let run_id = run_id.to_string();
            async move {
                let run = api
                    .retrieve_run(&thread_id, &run_id)
                    .await
                    .map_err(|e| backoff::Error::permanent(QueryError::Upstream(e)))?;

                debug!(%run_id, status = %run.status, "run status polled");
                if run.status.is_settled() {
                    Ok(run)
                } else {
                    Err(backoff::Error::transient(QueryError::Timeout(
                        deadline_secs,
                    )))
                }
            }
        })
        .await
    }
}
