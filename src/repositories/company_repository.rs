use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Company, UserProfile};
use crate::utils::errors::{AppError, AppResult};

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Crear la empresa y guardar el perfil de su administrador en una transacción
    async fn create_with_admin(&self, company: &Company, admin: &UserProfile) -> AppResult<Company>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Company>>;
    async fn update(&self, company: &Company) -> AppResult<Company>;
}

pub struct PgCompanyRepository {
    pool: PgPool,
}

impl PgCompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyRepository for PgCompanyRepository {
    async fn create_with_admin(&self, company: &Company, admin: &UserProfile) -> AppResult<Company> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (id, name, address, industry, is_rental_company, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(company.id)
        .bind(&company.name)
        .bind(&company.address)
        .bind(&company.industry)
        .bind(company.is_rental_company)
        .bind(company.created_at)
        .bind(company.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        // El perfil puede existir ya (sin empresa) o ser nuevo
        sqlx::query(
            r#"
            INSERT INTO user_profiles (id, user_id, company_id, role, name, email, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE
            SET company_id = EXCLUDED.company_id, role = EXCLUDED.role
            "#,
        )
        .bind(admin.id)
        .bind(admin.user_id)
        .bind(admin.company_id)
        .bind(admin.role)
        .bind(&admin.name)
        .bind(&admin.email)
        .bind(admin.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Company>> {
        let result = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(result)
    }

    async fn update(&self, company: &Company) -> AppResult<Company> {
        sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies
            SET name = $2, address = $3, industry = $4, is_rental_company = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(company.id)
        .bind(&company.name)
        .bind(&company.address)
        .bind(&company.industry)
        .bind(company.is_rental_company)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Company not found".to_string()))
    }
}
