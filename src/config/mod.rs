pub mod schema;

pub use schema::{
    CharacterConfig, Config, GatewayConfig, ObservabilityConfig, PersonaConfig, RepliesConfig,
    SearchBackend, SearchConfig, StorageConfig, VisionConfig,
};
