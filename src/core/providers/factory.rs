use super::compatible::OpenAiCompatibleProvider;
use super::traits::CompletionProvider;
use crate::config::Config;
use std::sync::Arc;

/// Derive a short provider label from the configured base URL host.
fn provider_label(base_url: &str) -> String {
    let Ok(parsed) = url::Url::parse(base_url) else {
        return "completion".to_string();
    };
    match parsed.host() {
        Some(url::Host::Domain(domain)) => {
            let parts: Vec<&str> = domain.split('.').collect();
            match parts.as_slice() {
                [.., name, _tld] => (*name).to_string(),
                _ => domain.to_string(),
            }
        }
        Some(host) => host.to_string(),
        None => "completion".to_string(),
    }
}

pub fn create_completion_provider(config: &Config) -> Arc<dyn CompletionProvider> {
    Arc::new(OpenAiCompatibleProvider::new(
        &provider_label(&config.base_url),
        &config.base_url,
        config.api_key.as_deref(),
    ))
}
