//! Image description for inbound pictures.

mod describer;
mod normalize;

pub use describer::DashScopeDescriber;
pub use normalize::{NormalizedImage, normalize_bytes, normalize_inline, strip_data_uri};

use crate::config::VisionConfig;
use crate::error::VisionError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type DescribeFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, VisionError>> + Send + 'a>>;

/// An image reference as received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput {
    /// Base64 payload, optionally carrying a data-URI prefix.
    Inline(String),
    /// Remote `http(s)` URL fetched before description.
    Url(String),
}

impl ImageInput {
    /// Classify a client-supplied reference. `None` for blank input.
    pub fn from_reference(reference: &str) -> Option<Self> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }
        let is_remote = url::Url::parse(reference)
            .is_ok_and(|u| matches!(u.scheme(), "http" | "https"));
        Some(if is_remote {
            Self::Url(reference.to_string())
        } else {
            Self::Inline(reference.to_string())
        })
    }
}

pub trait ImageDescriber: Send + Sync {
    fn describe<'a>(&'a self, image: &'a ImageInput) -> DescribeFuture<'a>;
}

/// `None` when vision is not configured.
pub fn create_describer(config: &VisionConfig) -> Option<Arc<dyn ImageDescriber>> {
    let api_key = config.api_key.as_deref().filter(|k| !k.is_empty())?;
    Some(Arc::new(DashScopeDescriber::new(config, api_key)))
}
