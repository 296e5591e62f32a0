use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::FuelType;
use crate::utils::validation::{validate_license_plate, validate_not_blank, validate_vin};

// Request para crear un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(max = 80), custom = "validate_not_blank")]
    pub brand: String,
    #[validate(length(max = 80), custom = "validate_not_blank")]
    pub model: String,
    #[validate(custom = "validate_license_plate")]
    pub license_plate: String,
    #[validate(custom = "validate_vin")]
    pub vin: Option<String>,
    #[serde(default)]
    pub fuel_type: FuelType,
    #[validate(range(min = 1900, max = 2100))]
    pub year: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub mileage: i64,
    #[serde(default)]
    pub is_public: bool,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

// Request para actualizar un vehículo (patch)
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(max = 80), custom = "validate_not_blank")]
    pub brand: Option<String>,
    #[validate(length(max = 80), custom = "validate_not_blank")]
    pub model: Option<String>,
    #[validate(custom = "validate_license_plate")]
    pub license_plate: Option<String>,
    #[validate(custom = "validate_vin")]
    pub vin: Option<String>,
    pub fuel_type: Option<FuelType>,
    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,
    #[validate(range(min = 0))]
    pub mileage: Option<i64>,
    pub is_public: Option<bool>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignVehicleRequest {
    pub profile_id: Uuid,
}
