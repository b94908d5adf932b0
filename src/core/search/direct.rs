use super::render::{MAX_RENDERED_RESULTS, render_results};
use super::schema::parse_results;
use super::{SearchFuture, WebSearch};
use crate::core::providers::build_provider_client_with_timeout;
use crate::core::providers::scrub::{read_error_body, sanitize_api_error};
use crate::error::SearchError;
use reqwest::Client;
use serde::Serialize;

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    count: u32,
}

/// Plain web-search API: one POST, ranked results back.
pub struct DirectSearch {
    endpoint: String,
    api_key: String,
    count: u32,
    client: Client,
}

impl DirectSearch {
    pub fn new(endpoint: &str, api_key: &str, count: u32, timeout_secs: u64) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            count,
            client: build_provider_client_with_timeout(timeout_secs),
        }
    }

    async fn search_impl(&self, query: &str) -> Result<String, SearchError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&SearchRequest {
                query,
                count: self.count,
            })
            .send()
            .await
            .map_err(|e| SearchError::Request(sanitize_api_error(&e.to_string())))?;

        if !response.status().is_success() {
            let (status, message) = read_error_body(response).await;
            return Err(SearchError::Status { status, message });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SearchError::Schema(format!("body is not JSON: {e}")))?;
        let (version, results) = parse_results(&body)?;
        tracing::debug!(?version, results = results.len(), "parsed search response");

        if results.is_empty() {
            return Err(SearchError::NoResults);
        }
        let limit = (self.count as usize).min(MAX_RENDERED_RESULTS);
        Ok(render_results(&results[..results.len().min(limit)]))
    }
}

impl WebSearch for DirectSearch {
    fn name(&self) -> &str {
        "direct"
    }

    fn search<'a>(&'a self, query: &'a str) -> SearchFuture<'a> {
        Box::pin(self.search_impl(query))
    }
}
