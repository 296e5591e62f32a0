use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{UserProfile, Vehicle};
use crate::utils::validation::validate_not_blank;

#[derive(Debug, Deserialize, Validate)]
pub struct InviteDriverRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 120), custom = "validate_not_blank")]
    pub name: String,
}

// Perfil de la empresa con sus vehículos asignados
#[derive(Debug, Serialize)]
pub struct DriverResponse {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub is_pending: bool,
    pub assigned_vehicles: Vec<Vehicle>,
}
