mod core;
mod gateway;
mod observability;
mod persona;
mod providers;
mod storage;

pub use self::core::Config;
pub use gateway::GatewayConfig;
pub use observability::ObservabilityConfig;
pub use persona::{CharacterConfig, PersonaConfig, RepliesConfig};
pub use providers::{SearchBackend, SearchConfig, VisionConfig};
pub use storage::StorageConfig;
