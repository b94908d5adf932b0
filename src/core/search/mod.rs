//! Web search augmentation.

mod direct;
mod render;
mod schema;
mod tool_call;
mod trigger;

pub use direct::DirectSearch;
pub use render::{MAX_RENDERED_RESULTS, render_results};
pub use schema::{SchemaVersion, SearchResult, parse_results};
pub use tool_call::ToolCallSearch;
pub use trigger::should_search;

use crate::config::{SearchBackend, SearchConfig};
use crate::error::SearchError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type SearchFuture<'a> = Pin<Box<dyn Future<Output = Result<String, SearchError>> + Send + 'a>>;

/// Produces a prompt-ready block of search results for a query.
pub trait WebSearch: Send + Sync {
    fn name(&self) -> &str;

    fn search<'a>(&'a self, query: &'a str) -> SearchFuture<'a>;
}

/// `None` when search is not configured.
pub fn create_web_search(config: &SearchConfig) -> Option<Arc<dyn WebSearch>> {
    let api_key = config.api_key.as_deref().filter(|k| !k.is_empty())?;
    let base_url = config.resolved_base_url();
    let search: Arc<dyn WebSearch> = match config.backend {
        SearchBackend::Direct => Arc::new(DirectSearch::new(
            base_url,
            api_key,
            config.result_count,
            config.timeout_secs,
        )),
        SearchBackend::ToolCall => Arc::new(ToolCallSearch::new(
            base_url,
            api_key,
            &config.model,
            config.timeout_secs,
        )),
    };
    Some(search)
}
