use crate::cli::commands::{Cli, Commands};
use crate::config::Config;
use crate::core::runtime::{build_orchestrator, open_store};
use crate::storage::ExchangeStore;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use super::chat::{run_interactive, run_single};

pub async fn dispatch(cli: Cli, config: Arc<Config>) -> Result<()> {
    if config.needs_api_key() && matches!(cli.command, Commands::Serve { .. } | Commands::Chat { .. })
    {
        tracing::warn!(
            config = %config.config_path.display(),
            "no completion api_key configured; replies will be error apologies"
        );
    }

    match cli.command {
        Commands::Serve { port, host } => {
            let port = port.unwrap_or(config.gateway.port);
            let host = host.unwrap_or_else(|| config.gateway.host.clone());
            if port == 0 {
                info!("Starting nekorelay gateway on {host} (random port)");
            } else {
                info!("Starting nekorelay gateway on {host}:{port}");
            }
            crate::transport::gateway::run_gateway(&host, port, Arc::clone(&config)).await
        }

        Commands::Chat { message, image } => {
            let orchestrator = build_orchestrator(&config).await?;
            if message.is_some() || image.is_some() {
                run_single(&orchestrator, message.as_deref(), image.as_deref()).await
            } else {
                run_interactive(&orchestrator).await
            }
        }

        Commands::Doctor => crate::doctor::run(&config).await,

        Commands::Records { limit } => {
            let store = open_store(&config).await?;
            let records = store.recent_exchanges(limit).await?;
            if records.is_empty() {
                println!("No exchanges recorded.");
            }
            for record in records {
                println!("#{} [{}]", record.id, record.created_at);
                println!("  user: {}", record.user_input);
                if let Some(description) = &record.image_description {
                    println!("  image: {description}");
                }
                println!("  reply: {}", record.ai_response);
            }
            Ok(())
        }

        Commands::Prune => {
            let store = open_store(&config).await?;
            let removed = store
                .prune_to(config.storage.max_records, config.storage.prune_batch)
                .await?;
            let remaining = store.count_exchanges().await?;
            println!("Pruned {removed} exchanges ({remaining} remaining).");
            Ok(())
        }
    }
}
