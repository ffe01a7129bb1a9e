use argus::adapters::health_handler::HealthHandler;
use argus::adapters::metrics_handler::{MetricsCollector, MetricsHandler};
use argus::adapters::query_handler::ApiState;
use argus::assistant::client::AssistantPort;
use argus::assistant::domain::{
    AssistantSpec, ContentBlock, Run, RunStatus, TextContent, ThreadMessage, ToolCall, ToolOutput,
};
use argus::assistant::error::ApiResult;
use argus::assistant::orchestrator::RunOrchestrator;
use argus::assistant::tools::{ToolRegistry, WebSearchTool, WEB_SEARCH_TOOL};
use argus::config::PollSettings;
use argus::domain::SearchPort;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt; // Correct import for oneshot

/// Assistant service fake replaying a scripted poll sequence and counting
/// every outbound operation.
struct FakeAssistant {
    poll_results: Mutex<VecDeque<Run>>,
    messages: Vec<ThreadMessage>,
    operations: AtomicUsize,
    submitted_outputs: Mutex<Vec<Vec<ToolOutput>>>,
}

impl FakeAssistant {
    fn new(poll_results: Vec<Run>, messages: Vec<ThreadMessage>) -> Arc<Self> {
        Arc::new(Self {
            poll_results: Mutex::new(poll_results.into()),
            messages,
            operations: AtomicUsize::new(0),
            submitted_outputs: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl AssistantPort for FakeAssistant {
    async fn create_assistant(&self, _spec: &AssistantSpec) -> ApiResult<String> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        Ok("asst_1".to_string())
    }

    async fn create_thread(&self) -> ApiResult<String> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        Ok("thread_1".to_string())
    }

    async fn create_message(&self, _thread_id: &str, _role: &str, _content: &str) -> ApiResult<()> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn create_run(&self, _thread_id: &str, _assistant_id: &str) -> ApiResult<Run> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        Ok(Run {
            id: "run_1".to_string(),
            status: RunStatus::Queued,
            pending_tool_calls: Vec::new(),
            last_error: None,
        })
    }

    async fn retrieve_run(&self, _thread_id: &str, _run_id: &str) -> ApiResult<Run> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        let mut results = self.poll_results.lock().unwrap();
        Ok(results.pop_front().unwrap_or(Run {
            id: "run_1".to_string(),
            status: RunStatus::Completed,
            pending_tool_calls: Vec::new(),
            last_error: None,
        }))
    }

    async fn submit_tool_outputs(
        &self,
        _thread_id: &str,
        _run_id: &str,
        outputs: &[ToolOutput],
    ) -> ApiResult<Run> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        self.submitted_outputs
            .lock()
            .unwrap()
            .push(outputs.to_vec());
        Ok(Run {
            id: "run_1".to_string(),
            status: RunStatus::InProgress,
            pending_tool_calls: Vec::new(),
            last_error: None,
        })
    }

    async fn list_messages(&self, _thread_id: &str) -> ApiResult<Vec<ThreadMessage>> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        Ok(self.messages.clone())
    }
}

struct FakeSearch {
    blob: String,
    queries: Mutex<Vec<String>>,
}

impl FakeSearch {
    fn new(blob: &str) -> Arc<Self> {
        Arc::new(Self {
            blob: blob.to_string(),
            queries: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SearchPort for FakeSearch {
    async fn search_context(&self, query: &str) -> ApiResult<String> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.blob.clone())
    }
}

fn text_message(role: &str, value: &str) -> ThreadMessage {
    ThreadMessage {
        role: role.to_string(),
        content: vec![ContentBlock {
            kind: "text".to_string(),
            text: Some(TextContent {
                value: value.to_string(),
            }),
        }],
    }
}

fn build_app(assistant: Arc<FakeAssistant>, search: Arc<FakeSearch>) -> Router {
    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(WebSearchTool::new(search)));

    let orchestrator = Arc::new(RunOrchestrator::new(
        assistant,
        tools,
        "asst_1".to_string(),
        PollSettings {
            interval_ms: 5,
            max_interval_ms: 10,
            deadline_secs: 1,
        },
    ));

    let collector = Arc::new(MetricsCollector::new().unwrap());
    let health_handler = Arc::new(HealthHandler::new(Some("asst_1".to_string())));
    let metrics_handler = Arc::new(MetricsHandler::new(collector.clone()));

    argus::create_app(
        ApiState {
            orchestrator,
            metrics: collector,
        },
        health_handler,
        metrics_handler,
    )
}

fn query_request(body: Value) -> Request<Body> {
    Request::builder()
        .uri("/query")
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

#[tokio::test]
async fn test_missing_input_is_rejected_without_upstream_calls() {
    let assistant = FakeAssistant::new(vec![], vec![]);
    let search = FakeSearch::new("unused");
    let app = build_app(assistant.clone(), search.clone());

    let response = app.oneshot(query_request(json!({}))).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"]["kind"], "validation");

    assert_eq!(assistant.operations.load(Ordering::SeqCst), 0);
    assert!(search.queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_input_is_rejected() {
    let assistant = FakeAssistant::new(vec![], vec![]);
    let search = FakeSearch::new("unused");
    let app = build_app(assistant.clone(), search);

    let response = app
        .oneshot(query_request(json!({"input": "   "})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(assistant.operations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_query_without_tool_use_returns_transcript() {
    let assistant = FakeAssistant::new(
        vec![Run {
            id: "run_1".to_string(),
            status: RunStatus::Completed,
            pending_tool_calls: Vec::new(),
            last_error: None,
        }],
        vec![
            text_message("user", "What is LimeSurvey?"),
            text_message("assistant", "An open-source survey platform."),
        ],
    );
    let search = FakeSearch::new("unused");
    let app = build_app(assistant, search.clone());

    let response = app
        .oneshot(query_request(json!({"input": "What is LimeSurvey?"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let messages = body["messages"].as_array().unwrap();
    assert!(!messages.is_empty());
    assert_eq!(messages[0], "user: What is LimeSurvey?");
    assert!(search.queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_end_to_end_tool_roundtrip() {
    let requires_action = Run {
        id: "run_1".to_string(),
        status: RunStatus::RequiresAction,
        pending_tool_calls: vec![ToolCall::new(
            "call_1",
            WEB_SEARCH_TOOL,
            "{\"query\":\"open-source survey tools market\"}",
        )],
        last_error: None,
    };
    let completed = Run {
        id: "run_1".to_string(),
        status: RunStatus::Completed,
        pending_tool_calls: Vec::new(),
        last_error: None,
    };
    let assistant = FakeAssistant::new(
        vec![requires_action, completed],
        vec![
            text_message("user", "Compare open-source survey tools"),
            text_message(
                "assistant",
                "LimeSurvey and Formbricks lead; sources: https://example.com",
            ),
        ],
    );
    let search = FakeSearch::new("Result blob A");
    let app = build_app(assistant.clone(), search.clone());

    let response = app
        .oneshot(query_request(
            json!({"input": "Compare open-source survey tools"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(
        body["messages"],
        json!([
            "user: Compare open-source survey tools",
            "assistant: LimeSurvey and Formbricks lead; sources: https://example.com"
        ])
    );

    assert_eq!(
        search.queries.lock().unwrap().as_slice(),
        ["open-source survey tools market"]
    );
    let submitted = assistant.submitted_outputs.lock().unwrap();
    assert_eq!(submitted.len(), 1);
    assert_eq!(
        submitted[0],
        vec![ToolOutput {
            tool_call_id: "call_1".to_string(),
            output: "Result blob A".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_failed_run_returns_bad_gateway_with_error_payload() {
    let failed = Run {
        id: "run_1".to_string(),
        status: RunStatus::Failed,
        pending_tool_calls: Vec::new(),
        last_error: Some(json!({"code": "server_error", "message": "model unavailable"})),
    };
    let assistant = FakeAssistant::new(vec![failed], vec![]);
    let search = FakeSearch::new("unused");
    let app = build_app(assistant, search);

    let response = app
        .oneshot(query_request(json!({"input": "anything"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = response_json(response).await;
    assert_eq!(body["error"]["kind"], "run_failed");
    assert_eq!(body["error"]["detail"]["code"], "server_error");
}

#[tokio::test]
async fn test_health_and_metrics_endpoints() {
    let assistant = FakeAssistant::new(vec![], vec![]);
    let search = FakeSearch::new("unused");
    let app = build_app(assistant, search);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "healthy");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
