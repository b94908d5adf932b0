//! Version-tagged parsers for search provider responses.
//!
//! The same provider family has shipped several envelope layouts. Each
//! layout gets its own typed parser; new drift is handled by adding a
//! variant here and nowhere else.

use crate::error::SearchError;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// `data.webPages.value[]` with `name`/`url`/`snippet`/`summary`.
    WebPagesCamel,
    /// `data.web_pages.value[]`, same item shape.
    WebPagesSnake,
    /// Top-level `results[]` with `title`/`url`/`snippet`|`content`.
    FlatResults,
}

impl SchemaVersion {
    pub const ALL: [Self; 3] = [Self::WebPagesCamel, Self::WebPagesSnake, Self::FlatResults];

    fn parse(self, body: &Value) -> Option<Vec<SearchResult>> {
        match self {
            Self::WebPagesCamel => serde_json::from_value::<CamelEnvelope>(body.clone())
                .ok()
                .map(|e| e.data.web_pages.into_results()),
            Self::WebPagesSnake => serde_json::from_value::<SnakeEnvelope>(body.clone())
                .ok()
                .map(|e| e.data.web_pages.into_results()),
            Self::FlatResults => serde_json::from_value::<FlatEnvelope>(body.clone())
                .ok()
                .map(FlatEnvelope::into_results),
        }
    }
}

#[derive(Deserialize)]
struct CamelEnvelope {
    data: CamelData,
}

#[derive(Deserialize)]
struct CamelData {
    #[serde(rename = "webPages")]
    web_pages: PageList,
}

#[derive(Deserialize)]
struct SnakeEnvelope {
    data: SnakeData,
}

#[derive(Deserialize)]
struct SnakeData {
    web_pages: PageList,
}

#[derive(Deserialize)]
struct PageList {
    #[serde(default)]
    value: Vec<PageItem>,
}

#[derive(Deserialize)]
struct PageItem {
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    summary: Option<String>,
}

impl PageList {
    fn into_results(self) -> Vec<SearchResult> {
        self.value
            .into_iter()
            .map(|item| SearchResult {
                title: item.name,
                url: item.url,
                snippet: item
                    .snippet
                    .filter(|s| !s.trim().is_empty())
                    .or(item.summary)
                    .unwrap_or_default(),
            })
            .collect()
    }
}

#[derive(Deserialize)]
struct FlatEnvelope {
    results: Vec<FlatItem>,
}

#[derive(Deserialize)]
struct FlatItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default, alias = "content")]
    snippet: String,
}

impl FlatEnvelope {
    fn into_results(self) -> Vec<SearchResult> {
        self.results
            .into_iter()
            .map(|item| SearchResult {
                title: item.title,
                url: item.url,
                snippet: item.snippet,
            })
            .collect()
    }
}

/// Parse a provider body with the first schema version that accepts it.
/// Provider rank order is preserved.
pub fn parse_results(body: &Value) -> Result<(SchemaVersion, Vec<SearchResult>), SearchError> {
    SchemaVersion::ALL
        .into_iter()
        .find_map(|version| version.parse(body).map(|results| (version, results)))
        .ok_or_else(|| {
            let keys = body
                .as_object()
                .map(|o| o.keys().cloned().collect::<Vec<_>>().join(","))
                .unwrap_or_default();
            SearchError::Schema(format!("unrecognised envelope (top-level keys: {keys})"))
        })
}
