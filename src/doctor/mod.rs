use crate::config::Config;
use crate::core::providers::{CompletionProvider, create_completion_provider};
use crate::core::runtime::open_store;
use crate::storage::ExchangeStore;
use anyhow::Result;

pub async fn run(config: &Config) -> Result<()> {
    println!("🩺 nekorelay doctor");
    println!("  Config: {}", config.config_path.display());

    for line in config_lines(config) {
        println!("{line}");
    }

    let provider = create_completion_provider(config);
    println!("{}", provider_line(provider.as_ref()).await);

    match open_store(config).await {
        Ok(store) => println!("{}", storage_line(store.as_ref()).await),
        Err(error) => println!("  ❌ storage unavailable: {error:#}"),
    }
    Ok(())
}

fn config_lines(config: &Config) -> Vec<String> {
    let mut lines = vec![
        format!("  model: {} via {}", config.default_model, config.base_url),
        format!(
            "  persona model id: {} ({})",
            config.persona.reserved_model, config.persona.character.name
        ),
        format!("  database: {}", config.database_path().display()),
    ];
    if config.needs_api_key() {
        lines.push("  ❌ completion api_key missing (set NEKORELAY_API_KEY)".into());
    } else {
        lines.push("  ✅ completion api_key configured".into());
    }
    lines.push(feature_line("vision", config.vision.is_enabled()));
    lines.push(feature_line("search", config.search.is_enabled()));
    lines
}

fn feature_line(name: &str, enabled: bool) -> String {
    if enabled {
        format!("  ✅ {name} augmentation enabled")
    } else {
        format!("  ⚪ {name} augmentation disabled (no api_key)")
    }
}

async fn provider_line(provider: &dyn CompletionProvider) -> String {
    match provider.list_models().await {
        Ok(models) => format!(
            "  ✅ provider {} reachable ({} models)",
            provider.name(),
            models.len()
        ),
        Err(error) => format!("  ❌ provider {} probe failed: {error}", provider.name()),
    }
}

async fn storage_line(store: &dyn ExchangeStore) -> String {
    if let Err(error) = store.ping().await {
        return format!("  ❌ storage ping failed: {error}");
    }
    match store.count_exchanges().await {
        Ok(count) => format!("  ✅ storage ok ({count} exchanges)"),
        Err(error) => format!("  ❌ storage count failed: {error}"),
    }
}
