use std::collections::HashMap;

use chrono::Utc;
use futures::future::try_join_all;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::trip_dto::{
    CompanyTripResponse, CreateTripRequest, TripListResponse, TripWithVehicle, UpdateTripRequest,
};
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::{total_kilometers, TripEntry, TripFilters, Vehicle};
use crate::repositories::Repositories;
use crate::services::authorization_service::AuthorizationService;
use crate::services::blob_storage::LocalBlobStore;
use crate::state::AppState;
use crate::utils::errors::{not_authorized, validation_error, AppError, AppResult};
use crate::utils::validation::non_empty;

pub struct TripController {
    repositories: Repositories,
    blobs: LocalBlobStore,
}

/// El odómetro final debe superar al inicial
fn ensure_odometer(km_start: i64, km_end: i64) -> AppResult<()> {
    if km_end <= km_start {
        return Err(validation_error(
            "km_end",
            "End odometer must be greater than start odometer",
        ));
    }
    Ok(())
}

impl TripController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repositories: state.repositories.clone(),
            blobs: state.blobs.clone(),
        }
    }

    fn authorization(&self) -> AuthorizationService<'_> {
        AuthorizationService::new(&self.repositories)
    }

    async fn vehicle(&self, vehicle_id: Uuid) -> AppResult<Vehicle> {
        self.repositories
            .vehicles
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateTripRequest,
    ) -> AppResult<ApiResponse<TripEntry>> {
        request.validate()?;
        ensure_odometer(request.km_start, request.km_end)?;

        let profile = self.authorization().profile_of(user).await?;
        let vehicle = self.vehicle(request.vehicle_id).await?;
        if !self.authorization().can_drive(&profile, &vehicle).await? {
            return Err(not_authorized());
        }

        let now = Utc::now();
        let trip = TripEntry {
            id: Uuid::new_v4(),
            profile_id: profile.id,
            company_id: vehicle.company_id,
            vehicle_id: vehicle.id,
            date: request.date,
            time_start: non_empty(request.time_start),
            time_end: non_empty(request.time_end),
            location_start: request.location_start.trim().to_string(),
            location_end: request.location_end.trim().to_string(),
            km_start: request.km_start,
            km_end: request.km_end,
            purpose: request.purpose.trim().to_string(),
            notes: non_empty(request.notes),
            created_at: now,
            updated_at: now,
        };

        let trip = self.repositories.trips.create(&trip).await?;
        info!("🛣️ Viaje {} registrado ({} km)", trip.id, trip.distance_km());
        Ok(ApiResponse::success_with_message(trip, "Trip created"))
    }

    /// Viajes propios con su vehículo
    pub async fn mine(&self, user: &AuthenticatedUser) -> AppResult<TripListResponse<TripWithVehicle>> {
        let profile = self.authorization().profile_of(user).await?;
        let trips = self.repositories.trips.list_by_profile(profile.id).await?;

        let mut vehicle_ids: Vec<Uuid> = trips.iter().map(|t| t.vehicle_id).collect();
        vehicle_ids.sort();
        vehicle_ids.dedup();
        let vehicles: HashMap<Uuid, Vehicle> = try_join_all(
            vehicle_ids
                .into_iter()
                .map(|id| self.repositories.vehicles.find_by_id(id)),
        )
        .await?
        .into_iter()
        .flatten()
        .map(|v| (v.id, v))
        .collect();

        let total_km = total_kilometers(&trips);
        let entries = trips
            .into_iter()
            .map(|trip| TripWithVehicle {
                distance_km: trip.distance_km(),
                vehicle: vehicles.get(&trip.vehicle_id).cloned(),
                trip,
            })
            .collect();

        Ok(TripListResponse { entries, total_km })
    }

    /// Viajes de la empresa con vehículo y conductor, filtrados
    pub async fn company(
        &self,
        user: &AuthenticatedUser,
        filters: TripFilters,
    ) -> AppResult<TripListResponse<CompanyTripResponse>> {
        let (_, company_id) = self.authorization().admin_of(user).await?;

        let trips = self.repositories.trips.list_by_company(company_id, &filters).await?;
        let vehicles: HashMap<_, _> = self
            .repositories
            .vehicles
            .list_by_company(company_id)
            .await?
            .into_iter()
            .map(|v| (v.id, v))
            .collect();
        let drivers: HashMap<_, _> = self
            .repositories
            .profiles
            .list_by_company(company_id)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let total_km = total_kilometers(&trips);
        let entries = trips
            .into_iter()
            .map(|trip| CompanyTripResponse {
                distance_km: trip.distance_km(),
                vehicle: vehicles.get(&trip.vehicle_id).cloned(),
                driver: drivers.get(&trip.profile_id).cloned(),
                trip,
            })
            .collect();

        Ok(TripListResponse { entries, total_km })
    }

    pub async fn get(&self, user: &AuthenticatedUser, trip_id: Uuid) -> AppResult<CompanyTripResponse> {
        let profile = self.authorization().profile_of(user).await?;
        let trip = self.authorization().accessible_trip(&profile, trip_id).await?;

        let vehicle = self.repositories.vehicles.find_by_id(trip.vehicle_id).await?;
        let driver = self.repositories.profiles.find_by_id(trip.profile_id).await?;

        Ok(CompanyTripResponse {
            distance_km: trip.distance_km(),
            trip,
            vehicle,
            driver,
        })
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        trip_id: Uuid,
        request: UpdateTripRequest,
    ) -> AppResult<ApiResponse<TripEntry>> {
        request.validate()?;

        let profile = self.authorization().profile_of(user).await?;
        let mut trip = self.authorization().accessible_trip(&profile, trip_id).await?;

        if let Some(vehicle_id) = request.vehicle_id.filter(|id| *id != trip.vehicle_id) {
            let vehicle = self.vehicle(vehicle_id).await?;
            if vehicle.company_id != trip.company_id
                || !self.authorization().can_drive(&profile, &vehicle).await?
            {
                return Err(not_authorized());
            }
            trip.vehicle_id = vehicle.id;
        }
        if let Some(date) = request.date {
            trip.date = date;
        }
        if request.time_start.is_some() {
            trip.time_start = non_empty(request.time_start);
        }
        if request.time_end.is_some() {
            trip.time_end = non_empty(request.time_end);
        }
        if let Some(location_start) = request.location_start {
            trip.location_start = location_start.trim().to_string();
        }
        if let Some(location_end) = request.location_end {
            trip.location_end = location_end.trim().to_string();
        }
        if let Some(km_start) = request.km_start {
            trip.km_start = km_start;
        }
        if let Some(km_end) = request.km_end {
            trip.km_end = km_end;
        }
        if let Some(purpose) = request.purpose {
            trip.purpose = purpose.trim().to_string();
        }
        if request.notes.is_some() {
            trip.notes = non_empty(request.notes);
        }
        ensure_odometer(trip.km_start, trip.km_end)?;
        trip.updated_at = Utc::now();

        let trip = self.repositories.trips.update(&trip).await?;
        Ok(ApiResponse::success_with_message(trip, "Trip updated"))
    }

    /// Borrar adjuntos y viaje en una transacción, luego los archivos
    pub async fn delete(&self, user: &AuthenticatedUser, trip_id: Uuid) -> AppResult<ApiResponse<()>> {
        let profile = self.authorization().profile_of(user).await?;
        let trip = self.authorization().accessible_trip(&profile, trip_id).await?;

        let attachments = self.repositories.trips.delete_with_attachments(trip.id).await?;
        for attachment in &attachments {
            if let Err(e) = self.blobs.delete(attachment.storage_id).await {
                warn!("⚠️ No se pudo borrar el archivo {}: {}", attachment.storage_id, e);
            }
        }

        info!("🗑️ Viaje {} eliminado con {} adjuntos", trip.id, attachments.len());
        Ok(ApiResponse::message("Trip deleted"))
    }
}
