use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

// ── Vision ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Image description is skipped entirely when no key is configured.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_vision_base_url")]
    pub base_url: String,
    #[serde(default = "default_vision_model")]
    pub model: String,
    #[serde(default = "default_vision_instruction")]
    pub instruction: String,
    #[serde(default = "default_vision_max_tokens")]
    pub max_tokens: u32,
    /// Longest edge, in pixels, after normalization.
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// Timeout for fetching remote image URLs and for the provider call.
    #[serde(default = "default_vision_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

fn default_vision_base_url() -> String {
    "https://dashscope.aliyuncs.com/api/v1".into()
}

fn default_vision_model() -> String {
    "qwen-vl-max".into()
}

fn default_vision_instruction() -> String {
    "Describe this image in detail.".into()
}

fn default_vision_max_tokens() -> u32 {
    300
}

fn default_max_dimension() -> u32 {
    1024
}

fn default_jpeg_quality() -> u8 {
    85
}

fn default_vision_timeout_secs() -> u64 {
    30
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_vision_base_url(),
            model: default_vision_model(),
            instruction: default_vision_instruction(),
            max_tokens: default_vision_max_tokens(),
            max_dimension: default_max_dimension(),
            jpeg_quality: default_jpeg_quality(),
            fetch_timeout_secs: default_vision_timeout_secs(),
        }
    }
}

impl VisionConfig {
    pub fn is_enabled(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_dimension == 0 {
            return Err(ConfigError::Validation(
                "vision.max_dimension must be > 0".into(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Validation(
                "vision.jpeg_quality must be within 1..=100".into(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "vision.fetch_timeout_secs must be > 0".into(),
            ));
        }
        Ok(())
    }
}

// ── Search ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchBackend {
    /// Plain web-search API: `{query, count}` in, ranked results out.
    #[default]
    Direct,
    /// Chat provider with a builtin `$web_search` tool resolved in one round.
    ToolCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub backend: SearchBackend,
    /// Search is skipped entirely when no key is configured.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Direct: full search endpoint. Tool call: chat API base URL.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Chat model used by the tool-call backend.
    #[serde(default = "default_search_model")]
    pub model: String,
    #[serde(default = "default_result_count")]
    pub result_count: u32,
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_search_model() -> String {
    "kimi-k2-0905-preview".into()
}

fn default_result_count() -> u32 {
    10
}

fn default_search_timeout_secs() -> u64 {
    30
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: SearchBackend::default(),
            api_key: None,
            base_url: None,
            model: default_search_model(),
            result_count: default_result_count(),
            timeout_secs: default_search_timeout_secs(),
        }
    }
}

impl SearchConfig {
    pub fn is_enabled(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    pub fn resolved_base_url(&self) -> &str {
        if let Some(url) = self.base_url.as_deref()
            && !url.is_empty()
        {
            return url;
        }
        match self.backend {
            SearchBackend::Direct => "https://api.bochaai.com/v1/web-search",
            SearchBackend::ToolCall => "https://api.moonshot.cn/v1",
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.result_count == 0 {
            return Err(ConfigError::Validation(
                "search.result_count must be > 0".into(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "search.timeout_secs must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn providers_disabled_without_keys() {
        assert!(!VisionConfig::default().is_enabled());
        assert!(!SearchConfig::default().is_enabled());
    }

    #[test]
    fn search_backend_serde_variants() {
        let cases = [
            (SearchBackend::Direct, "\"direct\""),
            (SearchBackend::ToolCall, "\"tool_call\""),
        ];
        for (backend, json) in cases {
            assert_eq!(serde_json::to_string(&backend).unwrap(), json);
            let parsed: SearchBackend = serde_json::from_str(json).unwrap();
            assert_eq!(parsed, backend);
        }
    }

    #[test]
    fn base_url_defaults_follow_backend() {
        let direct = SearchConfig::default();
        assert_eq!(
            direct.resolved_base_url(),
            "https://api.bochaai.com/v1/web-search"
        );

        let tool = SearchConfig {
            backend: SearchBackend::ToolCall,
            ..SearchConfig::default()
        };
        assert_eq!(tool.resolved_base_url(), "https://api.moonshot.cn/v1");

        let custom = SearchConfig {
            base_url: Some("http://127.0.0.1:9/search".into()),
            ..SearchConfig::default()
        };
        assert_eq!(custom.resolved_base_url(), "http://127.0.0.1:9/search");
    }

    #[test]
    fn vision_quality_bounds() {
        let config = VisionConfig {
            jpeg_quality: 0,
            ..VisionConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(VisionConfig::default().validate().is_ok());
    }
}
