//! Wiring of one relay instance from configuration.

use crate::config::Config;
use crate::core::orchestrator::{Orchestrator, TurnSettings};
use crate::core::persona::Persona;
use crate::core::providers::create_completion_provider;
use crate::core::search::create_web_search;
use crate::core::session::Session;
use crate::core::vision::create_describer;
use crate::storage::{ExchangeStore, SqliteExchangeStore};
use anyhow::{Context, Result};
use std::sync::Arc;

pub async fn open_store(config: &Config) -> Result<Arc<SqliteExchangeStore>> {
    let path = config.database_path();
    let store = SqliteExchangeStore::connect(&path).await?;
    tracing::debug!(path = %path.display(), "storage opened");
    Ok(Arc::new(store))
}

/// Stored persona, else the configured default (which is then stored).
pub async fn resolve_persona(store: &dyn ExchangeStore, config: &Config) -> Result<Persona> {
    match store.load_persona().await {
        Ok(Some(persona)) => return Ok(persona),
        Ok(None) => {}
        Err(error) => tracing::warn!(%error, "stored persona unreadable; using default"),
    }

    let persona = Persona::from_config(&config.persona.character)
        .context("default persona in config is invalid")?;
    if let Err(error) = store.save_persona(&persona).await {
        tracing::warn!(%error, "failed to store default persona");
    }
    Ok(persona)
}

pub async fn build_orchestrator(config: &Config) -> Result<Arc<Orchestrator>> {
    let store = open_store(config).await?;
    let persona = resolve_persona(store.as_ref(), config).await?;
    tracing::info!(persona = %persona.name, "persona loaded");

    let session = Arc::new(
        Session::new(persona, &config.persona.system_prompt_template)
            .context("render persona system prompt")?,
    );

    let describer = create_describer(&config.vision);
    let search = create_web_search(&config.search);
    tracing::info!(
        model = %config.default_model,
        vision = describer.is_some(),
        search = search.is_some(),
        "orchestrator ready"
    );

    let orchestrator = Orchestrator::new(
        session,
        create_completion_provider(config),
        store,
        TurnSettings::from_config(config),
        config.persona.replies.clone(),
    )
    .with_describer(describer)
    .with_search(search);
    Ok(Arc::new(orchestrator))
}
