use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    pub config: String,
    pub assistant: String,
}

pub struct HealthHandler {
    assistant_id: Option<String>,
    start_time: std::time::Instant,
}

impl HealthHandler {
    pub fn new(assistant_id: Option<String>) -> Self {
        Self {
            assistant_id,
            start_time: std::time::Instant::now(),
        }
    }

    /// Basic health check - returns 200 if server is running
    pub async fn health(&self) -> impl IntoResponse {
        let uptime = self.start_time.elapsed().as_secs();
        let status = HealthStatus {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: uptime,
            checks: HealthChecks {
                config: "ok".to_string(),
                assistant: if self.assistant_id.is_some() {
                    "registered".to_string()
                } else {
                    "unregistered".to_string()
                },
            },
        };

        (StatusCode::OK, Json(status))
    }

    /// Readiness check - returns 200 once the assistant is registered upstream
    pub async fn ready(&self) -> impl IntoResponse {
        match &self.assistant_id {
            Some(id) => (
                StatusCode::OK,
                Json(serde_json::json!({
                    "status": "ready",
                    "assistant_id": id,
                })),
            ),
            None => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "not_ready",
                    "message": "Assistant not registered"
                })),
            ),
        }
    }

    /// Liveness check - returns 200 if server is alive
    pub async fn live(&self) -> impl IntoResponse {
        (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "alive",
            })),
        )
    }
}
