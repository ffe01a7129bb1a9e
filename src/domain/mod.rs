//! Core ports implemented by outbound adapters.

use async_trait::async_trait;

use crate::assistant::error::ApiResult;

/// Outbound port for the web-search backend.
///
/// `search_context` issues one search call and returns an opaque context blob
/// (retrieved passages and their source URLs) suitable for direct inclusion
/// in a tool-result payload. Implementations do not retry and do not cache.
#[async_trait]
pub trait SearchPort: Send + Sync {
    async fn search_context(&self, query: &str) -> ApiResult<String>;
}
