use std::collections::HashSet;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::vehicle_dto::{AssignVehicleRequest, CreateVehicleRequest, UpdateVehicleRequest};
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::{Vehicle, VehicleAssignment};
use crate::repositories::Repositories;
use crate::services::authorization_service::AuthorizationService;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::{non_empty, normalize_license_plate};

pub struct VehicleController {
    repositories: Repositories,
}

fn plate_taken() -> AppError {
    AppError::Conflict("License plate is already registered for this company".to_string())
}

fn normalize_vin(vin: Option<String>) -> Option<String> {
    non_empty(vin).map(|v| v.to_uppercase())
}

impl VehicleController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repositories: state.repositories.clone(),
        }
    }

    fn authorization(&self) -> AuthorizationService<'_> {
        AuthorizationService::new(&self.repositories)
    }

    pub async fn list(&self, user: &AuthenticatedUser) -> AppResult<Vec<Vehicle>> {
        let (_, company_id) = self.authorization().admin_of(user).await?;
        self.repositories.vehicles.list_by_company(company_id).await
    }

    /// Vehículos asignados al usuario más los públicos de su empresa
    pub async fn assigned(&self, user: &AuthenticatedUser) -> AppResult<Vec<Vehicle>> {
        let (profile, company_id) = self.authorization().member_of(user).await?;

        let mut vehicles = self
            .repositories
            .assignments
            .vehicles_for_profile(profile.id)
            .await?;
        let mut seen: HashSet<Uuid> = vehicles.iter().map(|v| v.id).collect();

        let public = self.repositories.vehicles.list_by_company(company_id).await?;
        vehicles.extend(
            public
                .into_iter()
                .filter(|v| v.is_public && seen.insert(v.id)),
        );
        Ok(vehicles)
    }

    pub async fn get(&self, user: &AuthenticatedUser, vehicle_id: Uuid) -> AppResult<Vehicle> {
        let (_, company_id) = self.authorization().admin_of(user).await?;
        self.authorization().company_vehicle(company_id, vehicle_id).await
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateVehicleRequest,
    ) -> AppResult<ApiResponse<Vehicle>> {
        request.validate()?;
        let (_, company_id) = self.authorization().admin_of(user).await?;

        let license_plate = normalize_license_plate(&request.license_plate);
        if self
            .repositories
            .vehicles
            .license_plate_exists(company_id, &license_plate, None)
            .await?
        {
            return Err(plate_taken());
        }

        let now = Utc::now();
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            company_id,
            brand: request.brand.trim().to_string(),
            model: request.model.trim().to_string(),
            license_plate,
            vin: normalize_vin(request.vin),
            fuel_type: request.fuel_type,
            year: request.year,
            mileage: request.mileage,
            is_public: request.is_public,
            notes: non_empty(request.notes),
            created_at: now,
            updated_at: now,
        };

        let vehicle = self.repositories.vehicles.create(&vehicle).await?;
        info!("🚗 Vehículo {} ({}) creado", vehicle.id, vehicle.license_plate);
        Ok(ApiResponse::success_with_message(vehicle, "Vehicle created"))
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        vehicle_id: Uuid,
        request: UpdateVehicleRequest,
    ) -> AppResult<ApiResponse<Vehicle>> {
        request.validate()?;
        let (_, company_id) = self.authorization().admin_of(user).await?;
        let mut vehicle = self.authorization().company_vehicle(company_id, vehicle_id).await?;

        if let Some(license_plate) = request.license_plate {
            let license_plate = normalize_license_plate(&license_plate);
            if self
                .repositories
                .vehicles
                .license_plate_exists(company_id, &license_plate, Some(vehicle.id))
                .await?
            {
                return Err(plate_taken());
            }
            vehicle.license_plate = license_plate;
        }
        if let Some(brand) = request.brand {
            vehicle.brand = brand.trim().to_string();
        }
        if let Some(model) = request.model {
            vehicle.model = model.trim().to_string();
        }
        if request.vin.is_some() {
            vehicle.vin = normalize_vin(request.vin);
        }
        if let Some(fuel_type) = request.fuel_type {
            vehicle.fuel_type = fuel_type;
        }
        if let Some(year) = request.year {
            vehicle.year = year;
        }
        if let Some(mileage) = request.mileage {
            vehicle.mileage = mileage;
        }
        if let Some(is_public) = request.is_public {
            vehicle.is_public = is_public;
        }
        if request.notes.is_some() {
            vehicle.notes = non_empty(request.notes);
        }
        vehicle.updated_at = Utc::now();

        let vehicle = self.repositories.vehicles.update(&vehicle).await?;
        Ok(ApiResponse::success_with_message(vehicle, "Vehicle updated"))
    }

    /// Borrar asignaciones y vehículo; no se permite mientras tenga viajes
    pub async fn delete(&self, user: &AuthenticatedUser, vehicle_id: Uuid) -> AppResult<ApiResponse<()>> {
        let (_, company_id) = self.authorization().admin_of(user).await?;
        let vehicle = self.authorization().company_vehicle(company_id, vehicle_id).await?;

        let trips = self.repositories.trips.count_by_vehicle(vehicle.id).await?;
        if trips > 0 {
            return Err(AppError::Conflict(format!(
                "Vehicle has {} trip entries and cannot be deleted",
                trips
            )));
        }

        self.repositories.vehicles.delete_with_assignments(vehicle.id).await?;
        info!("🗑️ Vehículo {} eliminado", vehicle.id);
        Ok(ApiResponse::message("Vehicle deleted"))
    }

    pub async fn assign(
        &self,
        user: &AuthenticatedUser,
        vehicle_id: Uuid,
        request: AssignVehicleRequest,
    ) -> AppResult<ApiResponse<VehicleAssignment>> {
        let (_, company_id) = self.authorization().admin_of(user).await?;
        let vehicle = self.authorization().company_vehicle(company_id, vehicle_id).await?;

        let driver = self
            .repositories
            .profiles
            .find_by_id(request.profile_id)
            .await?
            .filter(|profile| profile.company_id == Some(company_id))
            .ok_or_else(|| AppError::NotFound("Driver not found or not authorized".to_string()))?;

        let assignment = self
            .repositories
            .assignments
            .create(&VehicleAssignment::new(driver.id, vehicle.id))
            .await?;
        Ok(ApiResponse::success_with_message(assignment, "Vehicle assigned"))
    }

    pub async fn unassign(
        &self,
        user: &AuthenticatedUser,
        vehicle_id: Uuid,
        profile_id: Uuid,
    ) -> AppResult<ApiResponse<()>> {
        let (_, company_id) = self.authorization().admin_of(user).await?;
        let vehicle = self.authorization().company_vehicle(company_id, vehicle_id).await?;

        if !self.repositories.assignments.delete(profile_id, vehicle.id).await? {
            return Err(AppError::NotFound("Assignment not found".to_string()));
        }
        Ok(ApiResponse::message("Vehicle unassigned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::test_support;
    use crate::controllers::DriverController;
    use crate::dto::driver_dto::InviteDriverRequest;
    use crate::models::FuelType;

    fn create_request(plate: &str, is_public: bool) -> CreateVehicleRequest {
        CreateVehicleRequest {
            brand: "VW".to_string(),
            model: "Passat".to_string(),
            license_plate: plate.to_string(),
            vin: Some(String::new()),
            fuel_type: FuelType::Diesel,
            year: 2021,
            mileage: 15_000,
            is_public,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_and_rejects_duplicate_plate() {
        let (state, _dir) = test_support::state().await;
        let (admin, _) = test_support::admin_with_company(&state, "boss@example.com").await;
        let controller = VehicleController::new(&state);

        let vehicle = controller
            .create(&admin, create_request(" m-ab  123 ", false))
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(vehicle.license_plate, "M-AB 123");
        assert_eq!(vehicle.vin, None);

        let result = controller.create(&admin, create_request("M-AB 123", true)).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_same_plate_in_other_company_allowed() {
        let (state, _dir) = test_support::state().await;
        let (admin, _) = test_support::admin_with_company(&state, "boss@example.com").await;
        let (other, _) = test_support::admin_with_company(&state, "other@example.com").await;
        let controller = VehicleController::new(&state);

        controller.create(&admin, create_request("M-AB 1", false)).await.unwrap();
        controller.create(&other, create_request("M-AB 1", false)).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_is_patch() {
        let (state, _dir) = test_support::state().await;
        let (admin, _) = test_support::admin_with_company(&state, "boss@example.com").await;
        let controller = VehicleController::new(&state);
        let vehicle = controller
            .create(&admin, create_request("M-AB 1", false))
            .await
            .unwrap()
            .data
            .unwrap();

        let updated = controller
            .update(
                &admin,
                vehicle.id,
                UpdateVehicleRequest {
                    mileage: Some(20_000),
                    is_public: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(updated.mileage, 20_000);
        assert!(updated.is_public);
        assert_eq!(updated.license_plate, "M-AB 1");
        assert_eq!(updated.brand, "VW");
    }

    #[tokio::test]
    async fn test_assign_and_unassign() {
        let (state, _dir) = test_support::state().await;
        let (admin, _) = test_support::admin_with_company(&state, "boss@example.com").await;
        let controller = VehicleController::new(&state);
        let vehicle = controller
            .create(&admin, create_request("M-AB 1", false))
            .await
            .unwrap()
            .data
            .unwrap();
        let driver = DriverController::new(&state)
            .invite(
                &admin,
                InviteDriverRequest {
                    email: "dora@example.com".to_string(),
                    name: "Dora".to_string(),
                },
            )
            .await
            .unwrap()
            .data
            .unwrap();

        let request = || AssignVehicleRequest { profile_id: driver.id };
        controller.assign(&admin, vehicle.id, request()).await.unwrap();
        assert!(matches!(
            controller.assign(&admin, vehicle.id, request()).await,
            Err(AppError::Conflict(_))
        ));

        controller.unassign(&admin, vehicle.id, driver.id).await.unwrap();
        assert!(matches!(
            controller.unassign(&admin, vehicle.id, driver.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_assigned_lists_own_and_public_vehicles() {
        let (state, _dir) = test_support::state().await;
        let (admin, _) = test_support::admin_with_company(&state, "boss@example.com").await;
        let controller = VehicleController::new(&state);

        let private = controller.create(&admin, create_request("P-1", false)).await.unwrap().data.unwrap();
        let hidden = controller.create(&admin, create_request("P-2", false)).await.unwrap().data.unwrap();
        let public = controller.create(&admin, create_request("P-3", true)).await.unwrap().data.unwrap();

        let profile = DriverController::new(&state)
            .invite(
                &admin,
                InviteDriverRequest {
                    email: "dora@example.com".to_string(),
                    name: "Dora".to_string(),
                },
            )
            .await
            .unwrap()
            .data
            .unwrap();
        controller
            .assign(&admin, private.id, AssignVehicleRequest { profile_id: profile.id })
            .await
            .unwrap();

        let driver = test_support::sign_up(&state, "dora@example.com", "Dora").await;
        let ids: Vec<Uuid> = controller.assigned(&driver).await.unwrap().iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![private.id, public.id]);
        assert!(!ids.contains(&hidden.id));

        assert!(matches!(controller.list(&driver).await, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_foreign_company_vehicle_is_not_found() {
        let (state, _dir) = test_support::state().await;
        let (admin, _) = test_support::admin_with_company(&state, "boss@example.com").await;
        let (other, _) = test_support::admin_with_company(&state, "other@example.com").await;
        let controller = VehicleController::new(&state);
        let drivers = DriverController::new(&state);

        let vehicle = controller
            .create(&admin, create_request("M-AB 1", false))
            .await
            .unwrap()
            .data
            .unwrap();
        let own_driver = drivers
            .invite(
                &admin,
                InviteDriverRequest {
                    email: "dora@example.com".to_string(),
                    name: "Dora".to_string(),
                },
            )
            .await
            .unwrap()
            .data
            .unwrap();
        let foreign_driver = drivers
            .invite(
                &other,
                InviteDriverRequest {
                    email: "fritz@example.com".to_string(),
                    name: "Fritz".to_string(),
                },
            )
            .await
            .unwrap()
            .data
            .unwrap();
        controller
            .assign(&admin, vehicle.id, AssignVehicleRequest { profile_id: own_driver.id })
            .await
            .unwrap();

        assert!(matches!(
            controller.get(&other, vehicle.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            controller
                .update(
                    &other,
                    vehicle.id,
                    UpdateVehicleRequest {
                        mileage: Some(99_999),
                        is_public: Some(true),
                        ..Default::default()
                    },
                )
                .await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            controller
                .assign(&other, vehicle.id, AssignVehicleRequest { profile_id: foreign_driver.id })
                .await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            controller.unassign(&other, vehicle.id, own_driver.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            controller.delete(&other, vehicle.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(controller.list(&other).await.unwrap().is_empty());

        // Un perfil de otra empresa tampoco puede recibir el vehículo
        match controller
            .assign(&admin, vehicle.id, AssignVehicleRequest { profile_id: foreign_driver.id })
            .await
        {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "Driver not found or not authorized"),
            result => panic!("unexpected result: {:?}", result.map(|r| r.data)),
        }

        let unchanged = controller.get(&admin, vehicle.id).await.unwrap();
        assert_eq!(unchanged, vehicle);
        assert!(state
            .repositories
            .assignments
            .exists(own_driver.id, vehicle.id)
            .await
            .unwrap());
        assert!(!state
            .repositories
            .assignments
            .exists(foreign_driver.id, vehicle.id)
            .await
            .unwrap());
    }
}
