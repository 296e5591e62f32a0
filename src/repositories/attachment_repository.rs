use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Attachment;
use crate::repositories::user_repository::unique_violation;
use crate::utils::errors::AppResult;

#[async_trait]
pub trait AttachmentRepository: Send + Sync {
    async fn create(&self, attachment: &Attachment) -> AppResult<Attachment>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Attachment>>;
    async fn list_by_trip(&self, trip_id: Uuid) -> AppResult<Vec<Attachment>>;
    /// Devuelve `false` si no existía el adjunto
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

pub struct PgAttachmentRepository {
    pool: PgPool,
}

impl PgAttachmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttachmentRepository for PgAttachmentRepository {
    async fn create(&self, attachment: &Attachment) -> AppResult<Attachment> {
        sqlx::query_as::<_, Attachment>(
            r#"
            INSERT INTO attachments (id, trip_id, storage_id, file_name, kind, content_type, size_bytes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(attachment.id)
        .bind(attachment.trip_id)
        .bind(attachment.storage_id)
        .bind(&attachment.file_name)
        .bind(attachment.kind)
        .bind(&attachment.content_type)
        .bind(attachment.size_bytes)
        .bind(attachment.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "File is already attached"))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Attachment>> {
        let attachment = sqlx::query_as::<_, Attachment>("SELECT * FROM attachments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(attachment)
    }

    async fn list_by_trip(&self, trip_id: Uuid) -> AppResult<Vec<Attachment>> {
        let attachments = sqlx::query_as::<_, Attachment>(
            "SELECT * FROM attachments WHERE trip_id = $1 ORDER BY created_at",
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(attachments)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM attachments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
