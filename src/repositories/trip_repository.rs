use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Attachment, TripEntry, TripFilters};
use crate::utils::errors::{AppError, AppResult};

#[async_trait]
pub trait TripRepository: Send + Sync {
    async fn create(&self, trip: &TripEntry) -> AppResult<TripEntry>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<TripEntry>>;
    /// Viajes de un perfil, más recientes primero
    async fn list_by_profile(&self, profile_id: Uuid) -> AppResult<Vec<TripEntry>>;
    /// Viajes de una empresa con filtros, más recientes primero
    async fn list_by_company(&self, company_id: Uuid, filters: &TripFilters) -> AppResult<Vec<TripEntry>>;
    async fn count_by_vehicle(&self, vehicle_id: Uuid) -> AppResult<i64>;
    async fn update(&self, trip: &TripEntry) -> AppResult<TripEntry>;
    /// Borrar los adjuntos y el viaje; devuelve los adjuntos borrados
    async fn delete_with_attachments(&self, id: Uuid) -> AppResult<Vec<Attachment>>;
}

pub struct PgTripRepository {
    pool: PgPool,
}

impl PgTripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TripRepository for PgTripRepository {
    async fn create(&self, trip: &TripEntry) -> AppResult<TripEntry> {
        let created = sqlx::query_as::<_, TripEntry>(
            r#"
            INSERT INTO fahrtenbuch_entries (
                id, profile_id, company_id, vehicle_id, date, time_start, time_end,
                location_start, location_end, km_start, km_end, purpose, notes,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(trip.id)
        .bind(trip.profile_id)
        .bind(trip.company_id)
        .bind(trip.vehicle_id)
        .bind(trip.date)
        .bind(&trip.time_start)
        .bind(&trip.time_end)
        .bind(&trip.location_start)
        .bind(&trip.location_end)
        .bind(trip.km_start)
        .bind(trip.km_end)
        .bind(&trip.purpose)
        .bind(&trip.notes)
        .bind(trip.created_at)
        .bind(trip.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<TripEntry>> {
        let trip = sqlx::query_as::<_, TripEntry>("SELECT * FROM fahrtenbuch_entries WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(trip)
    }

    async fn list_by_profile(&self, profile_id: Uuid) -> AppResult<Vec<TripEntry>> {
        let trips = sqlx::query_as::<_, TripEntry>(
            r#"
            SELECT * FROM fahrtenbuch_entries
            WHERE profile_id = $1
            ORDER BY date DESC, time_start DESC NULLS LAST, created_at DESC
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(trips)
    }

    async fn list_by_company(&self, company_id: Uuid, filters: &TripFilters) -> AppResult<Vec<TripEntry>> {
        let trips = sqlx::query_as::<_, TripEntry>(
            r#"
            SELECT * FROM fahrtenbuch_entries
            WHERE company_id = $1
            AND ($2::uuid IS NULL OR vehicle_id = $2)
            AND ($3::uuid IS NULL OR profile_id = $3)
            AND ($4::date IS NULL OR date >= $4)
            AND ($5::date IS NULL OR date <= $5)
            ORDER BY date DESC, time_start DESC NULLS LAST, created_at DESC
            "#,
        )
        .bind(company_id)
        .bind(filters.vehicle_id)
        .bind(filters.profile_id)
        .bind(filters.date_from)
        .bind(filters.date_to)
        .fetch_all(&self.pool)
        .await?;
        Ok(trips)
    }

    async fn count_by_vehicle(&self, vehicle_id: Uuid) -> AppResult<i64> {
        let result: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM fahrtenbuch_entries WHERE vehicle_id = $1")
                .bind(vehicle_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(result.0)
    }

    async fn update(&self, trip: &TripEntry) -> AppResult<TripEntry> {
        sqlx::query_as::<_, TripEntry>(
            r#"
            UPDATE fahrtenbuch_entries
            SET date = $2, time_start = $3, time_end = $4, location_start = $5,
                location_end = $6, km_start = $7, km_end = $8, purpose = $9,
                notes = $10, vehicle_id = $11, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(trip.id)
        .bind(trip.date)
        .bind(&trip.time_start)
        .bind(&trip.time_end)
        .bind(&trip.location_start)
        .bind(&trip.location_end)
        .bind(trip.km_start)
        .bind(trip.km_end)
        .bind(&trip.purpose)
        .bind(&trip.notes)
        .bind(trip.vehicle_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))
    }

    async fn delete_with_attachments(&self, id: Uuid) -> AppResult<Vec<Attachment>> {
        let mut tx = self.pool.begin().await?;

        let attachments = sqlx::query_as::<_, Attachment>(
            "DELETE FROM attachments WHERE trip_id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM fahrtenbuch_entries WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Trip not found".to_string()));
        }

        tx.commit().await?;
        Ok(attachments)
    }
}
