use super::normalize::{NormalizedImage, normalize_bytes, normalize_inline};
use super::{DescribeFuture, ImageDescriber, ImageInput};
use crate::config::VisionConfig;
use crate::core::providers::build_provider_client_with_timeout;
use crate::core::providers::scrub::{read_error_body, sanitize_api_error};
use crate::error::VisionError;
use reqwest::Client;
use serde::{Deserialize, Serialize};

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    input: GenerationInput<'a>,
    parameters: GenerationParameters,
}

#[derive(Serialize)]
struct GenerationInput<'a> {
    messages: [GenerationMessage<'a>; 1],
}

#[derive(Serialize)]
struct GenerationMessage<'a> {
    role: &'static str,
    content: [RequestPart<'a>; 2],
}

#[derive(Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Image { image: String },
    Text { text: &'a str },
}

#[derive(Serialize)]
struct GenerationParameters {
    max_tokens: u32,
}

#[derive(Deserialize)]
struct GenerationResponse {
    output: Option<GenerationOutput>,
}

#[derive(Deserialize)]
struct GenerationOutput {
    #[serde(default)]
    choices: Vec<GenerationChoice>,
}

#[derive(Deserialize)]
struct GenerationChoice {
    message: GenerationReply,
}

#[derive(Deserialize)]
struct GenerationReply {
    content: ReplyContent,
}

/// Providers answer with either a bare string or a list of fragments.
#[derive(Deserialize)]
#[serde(untagged)]
enum ReplyContent {
    Text(String),
    Fragments(Vec<ReplyFragment>),
}

#[derive(Deserialize)]
struct ReplyFragment {
    #[serde(default)]
    text: Option<String>,
}

impl ReplyContent {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text.trim().to_string(),
            Self::Fragments(fragments) => fragments
                .into_iter()
                .filter_map(|f| f.text)
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

// ── Describer ────────────────────────────────────────────────────────

/// DashScope multimodal-generation client.
pub struct DashScopeDescriber {
    endpoint: String,
    api_key: String,
    model: String,
    instruction: String,
    max_tokens: u32,
    max_dimension: u32,
    jpeg_quality: u8,
    client: Client,
}

impl DashScopeDescriber {
    pub fn new(config: &VisionConfig, api_key: &str) -> Self {
        Self {
            endpoint: format!(
                "{}/services/aigc/multimodal-generation/generation",
                config.base_url.trim_end_matches('/')
            ),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            instruction: config.instruction.clone(),
            max_tokens: config.max_tokens,
            max_dimension: config.max_dimension,
            jpeg_quality: config.jpeg_quality,
            client: build_provider_client_with_timeout(config.fetch_timeout_secs),
        }
    }

    /// Resolve the input to a bounded JPEG payload.
    pub async fn prepare(&self, image: &ImageInput) -> Result<NormalizedImage, VisionError> {
        match image {
            ImageInput::Inline(data) => Ok(normalize_inline(
                data,
                self.max_dimension,
                self.jpeg_quality,
            )),
            ImageInput::Url(url) => {
                let bytes = self.fetch(url).await?;
                Ok(normalize_bytes(&bytes, self.max_dimension, self.jpeg_quality))
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, VisionError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| VisionError::Fetch(sanitize_api_error(&e.to_string())))?;

        if !response.status().is_success() {
            return Err(VisionError::Fetch(format!(
                "{url} returned HTTP {}",
                response.status().as_u16()
            )));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| VisionError::Fetch(e.to_string()))
    }

    async fn describe_impl(&self, image: &ImageInput) -> Result<String, VisionError> {
        let normalized = self.prepare(image).await?;
        let request = GenerationRequest {
            model: &self.model,
            input: GenerationInput {
                messages: [GenerationMessage {
                    role: "user",
                    content: [
                        RequestPart::Image {
                            image: normalized.to_data_uri(),
                        },
                        RequestPart::Text {
                            text: &self.instruction,
                        },
                    ],
                }],
            },
            parameters: GenerationParameters {
                max_tokens: self.max_tokens,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| VisionError::Request(sanitize_api_error(&e.to_string())))?;

        if !response.status().is_success() {
            let (status, message) = read_error_body(response).await;
            return Err(VisionError::Status { status, message });
        }

        let body: GenerationResponse = response
            .json()
            .await
            .map_err(|e| VisionError::Decode(e.to_string()))?;

        let description = body
            .output
            .and_then(|o| o.choices.into_iter().next())
            .map(|c| c.message.content.into_text())
            .ok_or_else(|| VisionError::Decode("response has no choices".into()))?;

        if description.is_empty() {
            return Err(VisionError::Empty);
        }
        Ok(description)
    }
}

impl ImageDescriber for DashScopeDescriber {
    fn describe<'a>(&'a self, image: &'a ImageInput) -> DescribeFuture<'a> {
        Box::pin(self.describe_impl(image))
    }
}
