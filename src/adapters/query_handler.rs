//! HTTP handler for the query endpoint

use axum::{extract::State, http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::adapters::metrics_handler::MetricsCollector;
use crate::assistant::error::QueryError;
use crate::assistant::orchestrator::RunOrchestrator;

/// Shared application state for the query endpoint
#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<RunOrchestrator>,
    pub metrics: Arc<MetricsCollector>,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub input: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub messages: Vec<String>,
}

/// `POST /query` - forward a question to the assistant and return the
/// flattened conversation transcript.
///
/// The body is validated before any outbound call is made; a missing body or
/// missing/empty `input` field is rejected with 400.
pub async fn post_query(
    State(state): State<ApiState>,
    body: Option<Json<QueryRequest>>,
) -> Response {
    let request_id = Uuid::new_v4();
    state.metrics.queries_in_flight.inc();
    let timer = state.metrics.query_duration.start_timer();

    let result = handle_query(&state, body, request_id).await;

    timer.observe_duration();
    state.metrics.queries_in_flight.dec();

    match result {
        Ok(response) => {
            state.metrics.queries_total.with_label_values(&["ok"]).inc();
            info!(%request_id, messages = response.messages.len(), "query completed");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => {
            state
                .metrics
                .queries_total
                .with_label_values(&["error"])
                .inc();
            state
                .metrics
                .query_errors
                .with_label_values(&[err.kind()])
                .inc();
            error_response(request_id, &err).into_response()
        }
    }
}

async fn handle_query(
    state: &ApiState,
    body: Option<Json<QueryRequest>>,
    request_id: Uuid,
) -> Result<QueryResponse, QueryError> {
    let input = body
        .and_then(|Json(request)| request.input)
        .ok_or_else(|| QueryError::Validation("missing required field `input`".to_string()))?;

    let input = input.trim();
    if input.is_empty() {
        return Err(QueryError::Validation(
            "`input` must be a non-empty string".to_string(),
        ));
    }

    info!(%request_id, "query received");

    let transcript = state.orchestrator.run_query(input).await?;
    Ok(QueryResponse {
        messages: transcript.iter().map(|entry| entry.render()).collect(),
    })
}

fn error_response(request_id: Uuid, err: &QueryError) -> (StatusCode, Json<Value>) {
    let status = match err {
        QueryError::Validation(_) => StatusCode::BAD_REQUEST,
        QueryError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        QueryError::Upstream(_) | QueryError::RunFailed(_) => StatusCode::BAD_GATEWAY,
        QueryError::ToolArguments(_) | QueryError::UnknownTool(_) | QueryError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    match err {
        QueryError::Validation(_) => warn!(%request_id, "{}", err),
        _ => error!(%request_id, "{}", err),
    }

    let mut error_body = json!({
        "kind": err.kind(),
        "message": err.to_string(),
    });
    if let QueryError::RunFailed(payload) = err {
        error_body["detail"] = payload.clone();
    }

    (status, Json(json!({ "error": error_body })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let cases = [
            (
                QueryError::Validation("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (QueryError::Timeout(30), StatusCode::GATEWAY_TIMEOUT),
            (
                QueryError::RunFailed(json!({"code": "c"})),
                StatusCode::BAD_GATEWAY,
            ),
            (
                QueryError::UnknownTool("t".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                QueryError::ToolArguments("bad".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let (status, _) = error_response(Uuid::new_v4(), &err);
            assert_eq!(status, expected, "wrong status for {:?}", err);
        }
    }

    #[test]
    fn test_run_failed_body_preserves_payload() {
        let err = QueryError::RunFailed(json!({"code": "rate_limit", "message": "quota"}));
        let (_, Json(body)) = error_response(Uuid::new_v4(), &err);
        assert_eq!(body["error"]["kind"], "run_failed");
        assert_eq!(body["error"]["detail"]["code"], "rate_limit");
    }
}
