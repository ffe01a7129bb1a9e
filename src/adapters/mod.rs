pub mod health_handler;
pub mod metrics_handler;
pub mod query_handler;
pub mod tavily;
