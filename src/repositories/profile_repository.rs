use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::UserProfile;
use crate::utils::errors::{AppError, AppResult};

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn create(&self, profile: &UserProfile) -> AppResult<UserProfile>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<UserProfile>>;
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<UserProfile>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserProfile>>;
    async fn list_by_company(&self, company_id: Uuid) -> AppResult<Vec<UserProfile>>;
    async fn update_contact(&self, id: Uuid, name: &str, email: &str) -> AppResult<UserProfile>;
    /// Vincular una invitación pendiente con una identidad
    async fn link_user(&self, id: Uuid, user_id: Uuid) -> AppResult<UserProfile>;
    /// Borrar las asignaciones del perfil y después el perfil
    async fn delete_with_assignments(&self, id: Uuid) -> AppResult<()>;
}

pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn create(&self, profile: &UserProfile) -> AppResult<UserProfile> {
        let created = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (id, user_id, company_id, role, name, email, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(profile.id)
        .bind(profile.user_id)
        .bind(profile.company_id)
        .bind(profile.role)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(profile.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT * FROM user_profiles WHERE user_id = $1 ORDER BY created_at LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT * FROM user_profiles WHERE LOWER(email) = LOWER($1) ORDER BY created_at LIMIT 1",
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn list_by_company(&self, company_id: Uuid) -> AppResult<Vec<UserProfile>> {
        let profiles = sqlx::query_as::<_, UserProfile>(
            "SELECT * FROM user_profiles WHERE company_id = $1 ORDER BY name",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(profiles)
    }

    async fn update_contact(&self, id: Uuid, name: &str, email: &str) -> AppResult<UserProfile> {
        sqlx::query_as::<_, UserProfile>(
            "UPDATE user_profiles SET name = $2, email = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User profile not found".to_string()))
    }

    async fn link_user(&self, id: Uuid, user_id: Uuid) -> AppResult<UserProfile> {
        sqlx::query_as::<_, UserProfile>(
            "UPDATE user_profiles SET user_id = $2 WHERE id = $1 AND user_id IS NULL RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::Conflict("Invitation was already claimed".to_string()))
    }

    async fn delete_with_assignments(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM vehicle_assignments WHERE profile_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM user_profiles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User profile not found".to_string()));
        }

        tx.commit().await?;
        Ok(())
    }
}
