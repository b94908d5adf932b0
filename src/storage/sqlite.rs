use super::traits::{ExchangeStore, StoreFuture};
use super::types::{ExchangeRecord, clamp_recent_limit};
use crate::core::persona::Persona;
use anyhow::Context;
use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use std::path::Path;

/// SQLite-backed exchange store using a sqlx pool.
pub struct SqliteExchangeStore {
    pool: SqlitePool,
}

impl SqliteExchangeStore {
    /// Wrap an existing pool and create tables.
    pub async fn new(pool: SqlitePool) -> anyhow::Result<Self> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS character_info (
                 name TEXT PRIMARY KEY,
                 personality TEXT NOT NULL,
                 owner_identifier TEXT NOT NULL DEFAULT '',
                 height TEXT NOT NULL DEFAULT '',
                 weight TEXT NOT NULL DEFAULT '',
                 catchphrases TEXT NOT NULL,
                 updated_at TEXT NOT NULL
             )",
        )
        .execute(&pool)
        .await
        .context("create character_info table")?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS chat_history (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 user_input TEXT NOT NULL,
                 ai_response TEXT NOT NULL,
                 image_description TEXT,
                 created_at TEXT NOT NULL
             )",
        )
        .execute(&pool)
        .await
        .context("create chat_history table")?;

        Ok(Self { pool })
    }

    /// Open (creating if needed) the database file at `path`.
    pub async fn connect(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create database directory {}", parent.display()))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .with_context(|| format!("open sqlite database {}", path.display()))?;
        Self::new(pool).await
    }

    /// Private in-memory database. A single connection keeps every query on
    /// the same database.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("open in-memory sqlite database")?;
        Self::new(pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn map_exchange_row(row: &SqliteRow) -> Result<ExchangeRecord, sqlx::Error> {
    Ok(ExchangeRecord {
        id: row.try_get("id")?,
        user_input: row.try_get("user_input")?,
        ai_response: row.try_get("ai_response")?,
        image_description: row.try_get("image_description")?,
        created_at: row.try_get("created_at")?,
    })
}

impl ExchangeStore for SqliteExchangeStore {
    fn load_persona(&self) -> StoreFuture<'_, Option<Persona>> {
        Box::pin(async move {
            let row = sqlx::query(
                "SELECT name, personality, owner_identifier, height, weight, catchphrases
                 FROM character_info
                 ORDER BY updated_at DESC
                 LIMIT 1",
            )
            .fetch_optional(&self.pool)
            .await?;

            let Some(row) = row else {
                return Ok(None);
            };

            let name: String = row.try_get("name")?;
            let personality: String = row.try_get("personality")?;
            let owner: String = row.try_get("owner_identifier")?;
            let height: String = row.try_get("height")?;
            let weight: String = row.try_get("weight")?;
            let catchphrases: String = row.try_get("catchphrases")?;

            Persona::from_parts(&name, &personality, &owner, &height, &weight, &catchphrases)
                .map(Some)
        })
    }

    fn save_persona<'a>(&'a self, persona: &'a Persona) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            sqlx::query(
                "INSERT INTO character_info
                     (name, personality, owner_identifier, height, weight, catchphrases, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 ON CONFLICT(name) DO UPDATE SET
                     personality = excluded.personality,
                     owner_identifier = excluded.owner_identifier,
                     height = excluded.height,
                     weight = excluded.weight,
                     catchphrases = excluded.catchphrases,
                     updated_at = excluded.updated_at",
            )
            .bind(&persona.name)
            .bind(&persona.personality)
            .bind(&persona.owner_identifier)
            .bind(&persona.height)
            .bind(&persona.weight)
            .bind(persona.catchphrases_joined())
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
            Ok(())
        })
    }

    fn append_exchange<'a>(
        &'a self,
        user_input: &'a str,
        ai_response: &'a str,
        image_description: Option<&'a str>,
    ) -> StoreFuture<'a, i64> {
        Box::pin(async move {
            let result = sqlx::query(
                "INSERT INTO chat_history (user_input, ai_response, image_description, created_at)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(user_input)
            .bind(ai_response)
            .bind(image_description)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
            Ok(result.last_insert_rowid())
        })
    }

    fn recent_exchanges(&self, limit: u32) -> StoreFuture<'_, Vec<ExchangeRecord>> {
        Box::pin(async move {
            let rows = sqlx::query(
                "SELECT id, user_input, ai_response, image_description, created_at
                 FROM chat_history
                 ORDER BY id DESC
                 LIMIT $1",
            )
            .bind(i64::from(clamp_recent_limit(limit)))
            .fetch_all(&self.pool)
            .await?;

            Ok(rows
                .iter()
                .map(map_exchange_row)
                .collect::<Result<Vec<_>, _>>()?)
        })
    }

    fn delete_exchange(&self, id: i64) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM chat_history WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected() > 0)
        })
    }

    fn clear_exchanges(&self) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM chat_history")
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected())
        })
    }

    fn delete_oldest(&self, n: u32) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            if n == 0 {
                return Ok(0);
            }
            let result = sqlx::query(
                "DELETE FROM chat_history
                 WHERE id IN (SELECT id FROM chat_history ORDER BY id ASC LIMIT $1)",
            )
            .bind(i64::from(n))
            .execute(&self.pool)
            .await?;
            Ok(result.rows_affected())
        })
    }

    fn count_exchanges(&self) -> StoreFuture<'_, u64> {
        Box::pin(async move {
            let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chat_history")
                .fetch_one(&self.pool)
                .await?;
            Ok(u64::try_from(count).unwrap_or(0))
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query("SELECT 1").execute(&self.pool).await?;
            Ok(())
        })
    }
}
