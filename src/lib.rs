//! # Argus - OSINT research gateway
//!
//! Argus exposes a single query endpoint that forwards a natural-language
//! question to a hosted assistant-conversation service, bridges the
//! assistant's web-search tool calls to a search backend, and returns the
//! resulting conversation transcript.
//!
//! ## Architecture
//!
//! - **Assistant**: domain types, the remote service client, the tool
//!   registry, and the run orchestration loop
//! - **Adapters**: external integrations (HTTP handlers, search backend)
//! - **Domain**: ports implemented by outbound adapters
//! - **Config**: configuration management

pub mod adapters;
pub mod assistant;
pub mod cli;
pub mod config;
pub mod domain;

use crate::adapters::health_handler::HealthHandler;
use crate::adapters::metrics_handler::MetricsHandler;
use crate::adapters::query_handler::{self, ApiState};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Creates the Axum application router with all endpoints configured.
///
/// # Arguments
///
/// * `api_state` - Shared state for the query endpoint
/// * `health_handler` - Health check handler
/// * `metrics_handler` - Metrics exposition handler
///
/// # Returns
///
/// Configured Axum Router
pub fn create_app(
    api_state: ApiState,
    health_handler: Arc<HealthHandler>,
    metrics_handler: Arc<MetricsHandler>,
) -> Router {
    let query_router = Router::new()
        .route("/query", post(query_handler::post_query))
        .with_state(api_state);

    let ops_router = Router::new()
        .route(
            "/health",
            get({
                let handler = health_handler.clone();
                move || {
                    let h = handler.clone();
                    async move { h.health().await }
                }
            }),
        )
        .route(
            "/health/ready",
            get({
                let handler = health_handler.clone();
                move || {
                    let h = handler.clone();
                    async move { h.ready().await }
                }
            }),
        )
        .route(
            "/health/live",
            get({
                let handler = health_handler.clone();
                move || {
                    let h = handler.clone();
                    async move { h.live().await }
                }
            }),
        )
        .route(
            "/metrics",
            get({
                let handler = metrics_handler.clone();
                move || {
                    let h = handler.clone();
                    async move { h.metrics().await }
                }
            }),
        );

    query_router.merge(ops_router).layer(
        tower_http::cors::CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}
