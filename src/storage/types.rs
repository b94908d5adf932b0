use serde::Serialize;

/// One persisted turn, as shown by the console and `records` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExchangeRecord {
    pub id: i64,
    pub user_input: String,
    pub ai_response: String,
    pub image_description: Option<String>,
    /// RFC 3339 UTC timestamp.
    pub created_at: String,
}

/// Bounds for `recent_exchanges`.
pub const MIN_RECENT_LIMIT: u32 = 1;
pub const MAX_RECENT_LIMIT: u32 = 100;

pub fn clamp_recent_limit(limit: u32) -> u32 {
    limit.clamp(MIN_RECENT_LIMIT, MAX_RECENT_LIMIT)
}
