pub mod conversation;
pub mod orchestrator;
pub mod persona;
pub mod providers;
pub mod runtime;
pub mod search;
pub mod session;
pub mod usage;
pub mod vision;
