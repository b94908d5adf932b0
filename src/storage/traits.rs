use super::types::ExchangeRecord;
use crate::core::persona::Persona;
use crate::error::StorageError;
use std::future::Future;
use std::pin::Pin;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

/// Persistence for the persona record and the exchange log.
pub trait ExchangeStore: Send + Sync {
    /// Most recently saved persona, `None` when none is stored.
    fn load_persona(&self) -> StoreFuture<'_, Option<Persona>>;

    /// Insert or replace the persona with the same name.
    fn save_persona<'a>(&'a self, persona: &'a Persona) -> StoreFuture<'a, ()>;

    /// Record a completed turn; returns the new row id.
    fn append_exchange<'a>(
        &'a self,
        user_input: &'a str,
        ai_response: &'a str,
        image_description: Option<&'a str>,
    ) -> StoreFuture<'a, i64>;

    /// Newest first; `limit` is clamped to `1..=100`.
    fn recent_exchanges(&self, limit: u32) -> StoreFuture<'_, Vec<ExchangeRecord>>;

    fn delete_exchange(&self, id: i64) -> StoreFuture<'_, bool>;

    fn clear_exchanges(&self) -> StoreFuture<'_, u64>;

    /// Delete the `n` oldest exchanges.
    fn delete_oldest(&self, n: u32) -> StoreFuture<'_, u64>;

    fn count_exchanges(&self) -> StoreFuture<'_, u64>;

    /// Once the log holds more than `max_records`, drop the oldest `batch`.
    fn prune_to(&self, max_records: u32, batch: u32) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            let count = self.count_exchanges().await?;
            if count <= u64::from(max_records) {
                return Ok(0);
            }
            let removed = self.delete_oldest(batch).await?;
            tracing::info!(count, removed, max_records, "pruned chat history");
            Ok(removed)
        })
    }

    /// Cheap connectivity probe.
    fn ping(&self) -> StoreFuture<'_, ()>;
}
