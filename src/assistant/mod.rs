//! Remote assistant subsystem: domain types, service client, tool bridge,
//! and the run orchestration loop.

pub mod client;
pub mod domain;
pub mod error;
pub mod orchestrator;
pub mod tools;

pub use client::{AssistantPort, OpenAiAssistantClient};
pub use error::{ApiError, QueryError};
pub use orchestrator::RunOrchestrator;
pub use tools::{ToolRegistry, WebSearchTool};
