use clap::{Parser, Subcommand};

/// `nekorelay` - persona-driven chat relay with search and vision augmentation.
#[derive(Parser, Debug)]
#[command(name = "nekorelay")]
#[command(version)]
#[command(about = "A persona-driven, OpenAI-compatible chat relay.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP gateway (OpenAI-compatible API and web console)
    Serve {
        /// Port to listen on (use 0 for random available port); defaults to config
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to; defaults to config
        #[arg(long)]
        host: Option<String>,
    },

    /// Chat with the persona in the terminal
    Chat {
        /// Single message mode (don't enter interactive mode)
        #[arg(short, long)]
        message: Option<String>,

        /// Image URL or base64 payload sent with the single message
        #[arg(short, long)]
        image: Option<String>,
    },

    /// Probe the completion provider and storage
    Doctor,

    /// Print recent exchanges, newest first
    Records {
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },

    /// Run one history pruning pass
    Prune,
}
