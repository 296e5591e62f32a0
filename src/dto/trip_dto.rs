use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{TripEntry, UserProfile, Vehicle};
use crate::utils::validation::{validate_not_blank, validate_time};

// Request para registrar un viaje
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTripRequest {
    pub vehicle_id: Uuid,
    pub date: NaiveDate,
    #[validate(custom = "validate_time")]
    pub time_start: Option<String>,
    #[validate(custom = "validate_time")]
    pub time_end: Option<String>,
    #[validate(length(max = 200), custom = "validate_not_blank")]
    pub location_start: String,
    #[validate(length(max = 200), custom = "validate_not_blank")]
    pub location_end: String,
    #[validate(range(min = 0, max = 10000000))]
    pub km_start: i64,
    #[validate(range(min = 0, max = 10000000))]
    pub km_end: i64,
    #[validate(length(max = 500), custom = "validate_not_blank")]
    pub purpose: String,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

// Request para actualizar un viaje (patch)
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTripRequest {
    pub vehicle_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    #[validate(custom = "validate_time")]
    pub time_start: Option<String>,
    #[validate(custom = "validate_time")]
    pub time_end: Option<String>,
    #[validate(length(max = 200), custom = "validate_not_blank")]
    pub location_start: Option<String>,
    #[validate(length(max = 200), custom = "validate_not_blank")]
    pub location_end: Option<String>,
    #[validate(range(min = 0, max = 10000000))]
    pub km_start: Option<i64>,
    #[validate(range(min = 0, max = 10000000))]
    pub km_end: Option<i64>,
    #[validate(length(max = 500), custom = "validate_not_blank")]
    pub purpose: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

// Viaje propio con su vehículo
#[derive(Debug, Serialize)]
pub struct TripWithVehicle {
    #[serde(flatten)]
    pub trip: TripEntry,
    pub distance_km: i64,
    pub vehicle: Option<Vehicle>,
}

// Viaje de la empresa con vehículo y conductor
#[derive(Debug, Serialize)]
pub struct CompanyTripResponse {
    #[serde(flatten)]
    pub trip: TripEntry,
    pub distance_km: i64,
    pub vehicle: Option<Vehicle>,
    pub driver: Option<UserProfile>,
}

#[derive(Debug, Serialize)]
pub struct TripListResponse<T> {
    pub entries: Vec<T>,
    pub total_km: i64,
}
