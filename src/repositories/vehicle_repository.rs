use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Vehicle;
use crate::repositories::user_repository::unique_violation;
use crate::utils::errors::{AppError, AppResult};

const PLATE_TAKEN: &str = "License plate is already registered for this company";

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn create(&self, vehicle: &Vehicle) -> AppResult<Vehicle>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>>;
    async fn list_by_company(&self, company_id: Uuid) -> AppResult<Vec<Vehicle>>;
    /// Matrícula ya usada en la empresa, ignorando `exclude` (el propio vehículo al editar)
    async fn license_plate_exists(
        &self,
        company_id: Uuid,
        license_plate: &str,
        exclude: Option<Uuid>,
    ) -> AppResult<bool>;
    async fn update(&self, vehicle: &Vehicle) -> AppResult<Vehicle>;
    /// Borrar las asignaciones del vehículo y después el vehículo
    async fn delete_with_assignments(&self, id: Uuid) -> AppResult<()>;
}

pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleRepository for PgVehicleRepository {
    async fn create(&self, vehicle: &Vehicle) -> AppResult<Vehicle> {
        sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (
                id, company_id, brand, model, license_plate, vin, fuel_type,
                year, mileage, is_public, notes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(vehicle.id)
        .bind(vehicle.company_id)
        .bind(&vehicle.brand)
        .bind(&vehicle.model)
        .bind(&vehicle.license_plate)
        .bind(&vehicle.vin)
        .bind(vehicle.fuel_type)
        .bind(vehicle.year)
        .bind(vehicle.mileage)
        .bind(vehicle.is_public)
        .bind(&vehicle.notes)
        .bind(vehicle.created_at)
        .bind(vehicle.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation(e, PLATE_TAKEN))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(vehicle)
    }

    async fn list_by_company(&self, company_id: Uuid) -> AppResult<Vec<Vehicle>> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE company_id = $1 ORDER BY brand, model, license_plate",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(vehicles)
    }

    async fn license_plate_exists(
        &self,
        company_id: Uuid,
        license_plate: &str,
        exclude: Option<Uuid>,
    ) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM vehicles
                WHERE company_id = $1
                AND UPPER(license_plate) = UPPER($2)
                AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(company_id)
        .bind(license_plate)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(result.0)
    }

    async fn update(&self, vehicle: &Vehicle) -> AppResult<Vehicle> {
        sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET brand = $2, model = $3, license_plate = $4, vin = $5, fuel_type = $6,
                year = $7, mileage = $8, is_public = $9, notes = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(vehicle.id)
        .bind(&vehicle.brand)
        .bind(&vehicle.model)
        .bind(&vehicle.license_plate)
        .bind(&vehicle.vin)
        .bind(vehicle.fuel_type)
        .bind(vehicle.year)
        .bind(vehicle.mileage)
        .bind(vehicle.is_public)
        .bind(&vehicle.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unique_violation(e, PLATE_TAKEN))?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))
    }

    async fn delete_with_assignments(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM vehicle_assignments WHERE vehicle_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Vehicle not found".to_string()));
        }

        tx.commit().await?;
        Ok(())
    }
}
