use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Persistence collaborator: a single targeted update of one list item's
/// follower field. Reapplying the same value is a no-op, so the write is
/// naturally idempotent.
#[async_trait]
pub trait FollowerStore: Send + Sync {
    async fn update_followers(&self, item_id: &str, value: &str) -> Result<()>;
}

pub struct PgFollowerStore {
    pool: PgPool,
}

impl PgFollowerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowerStore for PgFollowerStore {
    async fn update_followers(&self, item_id: &str, value: &str) -> Result<()> {
        let id = Uuid::parse_str(item_id).context("item_id is not a UUID")?;

        sqlx::query("UPDATE list_items SET followers_count = $1 WHERE id = $2")
            .bind(value)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("follower update failed")?;

        tracing::info!(item_id, value, "Follower count persisted");
        Ok(())
    }
}
