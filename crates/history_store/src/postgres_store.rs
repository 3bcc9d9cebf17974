//! Postgres-backed history store. No retention cap; ordering and
//! pagination are delegated to the database.

use async_trait::async_trait;
use chat_core::ConversationMessage;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::store::{ChatHistoryStore, SavedChat};

const TABLE: &str = "chats";

pub struct PostgresHistoryStore {
    pool: PgPool,
}

impl PostgresHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and make sure the schema exists. Fails fast with
    /// [`StoreError::NotConfigured`] when no URL is provided.
    pub async fn connect(database_url: &str) -> Result<Self> {
        if database_url.is_empty() {
            return Err(StoreError::NotConfigured(
                "remote history requested but DATABASE_URL is not set".to_string(),
            ));
        }

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {TABLE} (
                id UUID PRIMARY KEY,
                messages JSONB NOT NULL,
                model TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )"
        ))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn row_to_chat(row: &PgRow) -> Result<SavedChat> {
        let id: Uuid = row.try_get("id")?;
        let messages: serde_json::Value = row.try_get("messages")?;
        let model: String = row.try_get("model")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

        Ok(SavedChat {
            id: id.to_string(),
            messages: serde_json::from_value(messages)?,
            model,
            created_at,
            updated_at,
        })
    }

    fn parse_id(id: &str) -> Result<Uuid> {
        Uuid::parse_str(id).map_err(|_| StoreError::NotFound)
    }
}

#[async_trait]
impl ChatHistoryStore for PostgresHistoryStore {
    async fn list(&self) -> Result<Vec<SavedChat>> {
        let rows = sqlx::query(&format!(
            "SELECT id, messages, model, created_at, updated_at
             FROM {TABLE} ORDER BY updated_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_chat).collect()
    }

    async fn list_page(&self, page_size: usize, offset: usize) -> Result<Vec<SavedChat>> {
        let rows = sqlx::query(&format!(
            "SELECT id, messages, model, created_at, updated_at
             FROM {TABLE} ORDER BY updated_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(page_size as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_chat).collect()
    }

    async fn get_by_id(&self, id: &str) -> Result<SavedChat> {
        let row = sqlx::query(&format!(
            "SELECT id, messages, model, created_at, updated_at
             FROM {TABLE} WHERE id = $1"
        ))
        .bind(Self::parse_id(id)?)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        Self::row_to_chat(&row)
    }

    async fn save(
        &self,
        messages: &[ConversationMessage],
        model: &str,
    ) -> Result<Option<SavedChat>> {
        if messages.is_empty() {
            return Ok(None);
        }

        let now = Utc::now();
        let id = Uuid::new_v4();
        let payload = serde_json::to_value(messages)?;

        sqlx::query(&format!(
            "INSERT INTO {TABLE} (id, messages, model, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)"
        ))
        .bind(id)
        .bind(&payload)
        .bind(model)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Some(SavedChat {
            id: id.to_string(),
            messages: messages.to_vec(),
            model: model.to_string(),
            created_at: now,
            updated_at: now,
        }))
    }

    async fn update(
        &self,
        id: &str,
        messages: &[ConversationMessage],
        model: &str,
    ) -> Result<bool> {
        let payload = serde_json::to_value(messages)?;

        let result = sqlx::query(&format!(
            "UPDATE {TABLE} SET messages = $2, model = $3, updated_at = $4 WHERE id = $1"
        ))
        .bind(Self::parse_id(id)?)
        .bind(&payload)
        .bind(model)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query(&format!("DELETE FROM {TABLE} WHERE id = $1"))
            .bind(Self::parse_id(id)?)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear_all(&self) -> Result<bool> {
        sqlx::query(&format!("DELETE FROM {TABLE}"))
            .execute(&self.pool)
            .await?;
        Ok(true)
    }
}
