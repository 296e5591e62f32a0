//! Servicio de autorización
//!
//! Resuelve el perfil del usuario autenticado y aplica las reglas de acceso
//! por empresa, rol y propiedad de los registros.

use uuid::Uuid;

use crate::middleware::auth::AuthenticatedUser;
use crate::models::{TripEntry, UserProfile, Vehicle};
use crate::repositories::Repositories;
use crate::utils::errors::{not_authorized, AppError, AppResult};

pub struct AuthorizationService<'a> {
    repositories: &'a Repositories,
}

impl<'a> AuthorizationService<'a> {
    pub fn new(repositories: &'a Repositories) -> Self {
        Self { repositories }
    }

    /// Perfil del usuario autenticado
    pub async fn profile_of(&self, user: &AuthenticatedUser) -> AppResult<UserProfile> {
        self.repositories
            .profiles
            .find_by_user(user.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User profile not found".to_string()))
    }

    /// Perfil de un admin junto con la empresa que administra
    pub async fn admin_of(&self, user: &AuthenticatedUser) -> AppResult<(UserProfile, Uuid)> {
        let profile = self.profile_of(user).await?;
        let company_id = profile.admin_company().ok_or_else(not_authorized)?;
        Ok((profile, company_id))
    }

    /// Perfil de un miembro de cualquier empresa
    pub async fn member_of(&self, user: &AuthenticatedUser) -> AppResult<(UserProfile, Uuid)> {
        let profile = self.profile_of(user).await?;
        let company_id = profile
            .company_id
            .ok_or_else(|| AppError::NotFound("Company not found".to_string()))?;
        Ok((profile, company_id))
    }

    /// Vehículo de la empresa administrada; `None` y ajeno se tratan igual
    pub async fn company_vehicle(&self, company_id: Uuid, vehicle_id: Uuid) -> AppResult<Vehicle> {
        self.repositories
            .vehicles
            .find_by_id(vehicle_id)
            .await?
            .filter(|vehicle| vehicle.company_id == company_id)
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))
    }

    /// Admin de su empresa, asignado al vehículo, o vehículo público de su empresa
    pub async fn can_drive(&self, profile: &UserProfile, vehicle: &Vehicle) -> AppResult<bool> {
        if profile.admin_company() == Some(vehicle.company_id) {
            return Ok(true);
        }
        if vehicle.is_open_to(profile.company_id) {
            return Ok(true);
        }
        if profile.company_id != Some(vehicle.company_id) {
            return Ok(false);
        }
        self.repositories
            .assignments
            .exists(profile.id, vehicle.id)
            .await
    }

    /// Viaje accesible para el perfil: propio o de la empresa que administra
    pub async fn accessible_trip(&self, profile: &UserProfile, trip_id: Uuid) -> AppResult<TripEntry> {
        let trip = self
            .repositories
            .trips
            .find_by_id(trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

        if can_access_trip(profile, &trip) {
            Ok(trip)
        } else {
            Err(not_authorized())
        }
    }
}

pub fn can_access_trip(profile: &UserProfile, trip: &TripEntry) -> bool {
    trip.profile_id == profile.id || profile.admin_company() == Some(trip.company_id)
}
