use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Vehicle, VehicleAssignment};
use crate::repositories::user_repository::unique_violation;
use crate::utils::errors::AppResult;

#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    async fn create(&self, assignment: &VehicleAssignment) -> AppResult<VehicleAssignment>;
    async fn exists(&self, profile_id: Uuid, vehicle_id: Uuid) -> AppResult<bool>;
    /// Vehículos asignados a un perfil
    async fn vehicles_for_profile(&self, profile_id: Uuid) -> AppResult<Vec<Vehicle>>;
    /// Devuelve `false` si no existía la asignación
    async fn delete(&self, profile_id: Uuid, vehicle_id: Uuid) -> AppResult<bool>;
}

pub struct PgAssignmentRepository {
    pool: PgPool,
}

impl PgAssignmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssignmentRepository for PgAssignmentRepository {
    async fn create(&self, assignment: &VehicleAssignment) -> AppResult<VehicleAssignment> {
        sqlx::query_as::<_, VehicleAssignment>(
            r#"
            INSERT INTO vehicle_assignments (id, profile_id, vehicle_id, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(assignment.id)
        .bind(assignment.profile_id)
        .bind(assignment.vehicle_id)
        .bind(assignment.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "Vehicle is already assigned to this driver"))
    }

    async fn exists(&self, profile_id: Uuid, vehicle_id: Uuid) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM vehicle_assignments WHERE profile_id = $1 AND vehicle_id = $2)",
        )
        .bind(profile_id)
        .bind(vehicle_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(result.0)
    }

    async fn vehicles_for_profile(&self, profile_id: Uuid) -> AppResult<Vec<Vehicle>> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT v.* FROM vehicles v
            JOIN vehicle_assignments a ON a.vehicle_id = v.id
            WHERE a.profile_id = $1
            ORDER BY a.created_at
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(vehicles)
    }

    async fn delete(&self, profile_id: Uuid, vehicle_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM vehicle_assignments WHERE profile_id = $1 AND vehicle_id = $2",
        )
        .bind(profile_id)
        .bind(vehicle_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
