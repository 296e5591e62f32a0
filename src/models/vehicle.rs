//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle, el tipo de combustible y la tabla
//! de asignaciones vehículo-conductor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Tipo de combustible - mapea al ENUM fuel_type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "fuel_type", rename_all = "lowercase")]
pub enum FuelType {
    #[default]
    Petrol,
    Diesel,
    Electric,
    Hybrid,
    Lpg,
    Cng,
}

/// Vehicle principal - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Vehicle {
    pub id: Uuid,
    pub company_id: Uuid,
    pub brand: String,
    pub model: String,
    pub license_plate: String,
    pub vin: Option<String>,
    pub fuel_type: FuelType,
    pub year: i32,
    pub mileage: i64,
    pub is_public: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Un vehículo puede ser conducido por cualquier miembro si es público
    pub fn is_open_to(&self, company_id: Option<Uuid>) -> bool {
        self.is_public && company_id == Some(self.company_id)
    }
}

/// Asignación conductor-vehículo - mapea a vehicle_assignments
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct VehicleAssignment {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub vehicle_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl VehicleAssignment {
    pub fn new(profile_id: Uuid, vehicle_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            profile_id,
            vehicle_id,
            created_at: Utc::now(),
        }
    }
}
