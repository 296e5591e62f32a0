use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Company;
use crate::utils::validation::validate_not_blank;

// Request para crear una empresa
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCompanyRequest {
    #[validate(length(max = 200), custom = "validate_not_blank")]
    pub name: String,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 200))]
    pub industry: Option<String>,
    #[serde(default)]
    pub is_rental_company: bool,
}

// Request para actualizar una empresa (patch)
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCompanyRequest {
    #[validate(length(max = 200), custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 200))]
    pub industry: Option<String>,
    pub is_rental_company: Option<bool>,
}

// Resumen para el panel del admin
#[derive(Debug, Serialize)]
pub struct CompanyOverview {
    pub company: Company,
    pub vehicle_count: usize,
    pub public_vehicle_count: usize,
    pub member_count: usize,
    pub pending_invitation_count: usize,
    pub trip_count: usize,
    pub total_km: i64,
}
