pub mod sqlite;
pub mod traits;
pub mod types;

pub use sqlite::SqliteExchangeStore;
pub use traits::{ExchangeStore, StoreFuture};
pub use types::{ExchangeRecord, MAX_RECENT_LIMIT, clamp_recent_limit};
