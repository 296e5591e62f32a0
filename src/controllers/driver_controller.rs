use futures::future::try_join_all;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::driver_dto::{DriverResponse, InviteDriverRequest};
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::{UserProfile, UserRole};
use crate::repositories::Repositories;
use crate::services::authorization_service::AuthorizationService;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

pub struct DriverController {
    repositories: Repositories,
}

impl DriverController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repositories: state.repositories.clone(),
        }
    }

    fn authorization(&self) -> AuthorizationService<'_> {
        AuthorizationService::new(&self.repositories)
    }

    /// Perfiles de la empresa, cada uno con sus vehículos asignados
    pub async fn list(&self, user: &AuthenticatedUser) -> AppResult<Vec<DriverResponse>> {
        let (_, company_id) = self.authorization().admin_of(user).await?;
        let profiles = self.repositories.profiles.list_by_company(company_id).await?;

        try_join_all(profiles.into_iter().map(|profile| async move {
            let assigned_vehicles = self
                .repositories
                .assignments
                .vehicles_for_profile(profile.id)
                .await?;
            Ok::<_, AppError>(DriverResponse {
                is_pending: profile.is_pending(),
                profile,
                assigned_vehicles,
            })
        }))
        .await
    }

    /// Crear un perfil pendiente; se vincula ya si la identidad existe
    pub async fn invite(
        &self,
        user: &AuthenticatedUser,
        request: InviteDriverRequest,
    ) -> AppResult<ApiResponse<UserProfile>> {
        request.validate()?;
        let (_, company_id) = self.authorization().admin_of(user).await?;

        let email = request.email.trim().to_lowercase();
        if self.repositories.profiles.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("A user with this email already exists".to_string()));
        }

        let identity = self.repositories.users.find_by_email(&email).await?;
        if let Some(identity) = &identity {
            if self.repositories.profiles.find_by_user(identity.id).await?.is_some() {
                return Err(AppError::Conflict("A user with this email already exists".to_string()));
            }
        }

        let profile = UserProfile::new(
            identity.map(|u| u.id),
            Some(company_id),
            UserRole::Driver,
            request.name.trim().to_string(),
            email,
        );
        let profile = self.repositories.profiles.create(&profile).await?;

        info!(
            "✉️ Conductor {} invitado a la empresa {} (pendiente: {})",
            profile.id,
            company_id,
            profile.is_pending()
        );
        Ok(ApiResponse::success_with_message(profile, "Driver invited"))
    }

    /// Borrar asignaciones y perfil del conductor en una transacción
    pub async fn remove(&self, user: &AuthenticatedUser, profile_id: Uuid) -> AppResult<ApiResponse<()>> {
        let (admin, company_id) = self.authorization().admin_of(user).await?;

        if admin.id == profile_id {
            return Err(AppError::BadRequest("You cannot remove yourself".to_string()));
        }

        let driver = self
            .repositories
            .profiles
            .find_by_id(profile_id)
            .await?
            .filter(|profile| profile.company_id == Some(company_id))
            .ok_or_else(|| AppError::NotFound("Driver not found or not authorized".to_string()))?;

        self.repositories.profiles.delete_with_assignments(driver.id).await?;
        info!("🗑️ Conductor {} eliminado de la empresa {}", driver.id, company_id);
        Ok(ApiResponse::message("Driver removed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::test_support;
    use crate::models::{Vehicle, VehicleAssignment};
    use chrono::Utc;

    fn invite(email: &str) -> InviteDriverRequest {
        InviteDriverRequest {
            email: email.to_string(),
            name: "Dora".to_string(),
        }
    }

    fn vehicle(company_id: Uuid) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            company_id,
            brand: "Opel".to_string(),
            model: "Astra".to_string(),
            license_plate: "B-OP 42".to_string(),
            vin: None,
            fuel_type: Default::default(),
            year: 2019,
            mileage: 1000,
            is_public: false,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_invite_duplicate_email_fails() {
        let (state, _dir) = test_support::state().await;
        let (admin, _) = test_support::admin_with_company(&state, "boss@example.com").await;
        let controller = DriverController::new(&state);

        let profile = controller.invite(&admin, invite("dora@example.com")).await.unwrap();
        assert!(profile.data.unwrap().is_pending());

        let result = controller.invite(&admin, invite("DORA@example.com")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let result = controller.invite(&admin, invite("boss@example.com")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_invite_existing_identity_links_immediately() {
        let (state, _dir) = test_support::state().await;
        let (admin, company) = test_support::admin_with_company(&state, "boss@example.com").await;
        let driver = test_support::sign_up(&state, "dora@example.com", "Dora").await;

        let profile = DriverController::new(&state)
            .invite(&admin, invite("dora@example.com"))
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(profile.user_id, Some(driver.user_id));
        assert_eq!(profile.company_id, Some(company.id));
    }

    #[tokio::test]
    async fn test_list_includes_assigned_vehicles() {
        let (state, _dir) = test_support::state().await;
        let (admin, company) = test_support::admin_with_company(&state, "boss@example.com").await;
        let controller = DriverController::new(&state);

        let driver = controller.invite(&admin, invite("dora@example.com")).await.unwrap().data.unwrap();
        let car = state.repositories.vehicles.create(&vehicle(company.id)).await.unwrap();
        state
            .repositories
            .assignments
            .create(&VehicleAssignment::new(driver.id, car.id))
            .await
            .unwrap();

        let drivers = controller.list(&admin).await.unwrap();
        assert_eq!(drivers.len(), 2);
        let listed = drivers.iter().find(|d| d.profile.id == driver.id).unwrap();
        assert!(listed.is_pending);
        assert_eq!(listed.assigned_vehicles, vec![car]);
    }

    #[tokio::test]
    async fn test_remove_driver_cascades_assignments() {
        let (state, _dir) = test_support::state().await;
        let (admin, company) = test_support::admin_with_company(&state, "boss@example.com").await;
        let controller = DriverController::new(&state);

        let driver = controller.invite(&admin, invite("dora@example.com")).await.unwrap().data.unwrap();
        let car = state.repositories.vehicles.create(&vehicle(company.id)).await.unwrap();
        state
            .repositories
            .assignments
            .create(&VehicleAssignment::new(driver.id, car.id))
            .await
            .unwrap();

        controller.remove(&admin, driver.id).await.unwrap();

        assert!(state.repositories.profiles.find_by_id(driver.id).await.unwrap().is_none());
        assert!(!state.repositories.assignments.exists(driver.id, car.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_checks_company_and_self() {
        let (state, _dir) = test_support::state().await;
        let (admin, _) = test_support::admin_with_company(&state, "boss@example.com").await;
        let (other_admin, _) = test_support::admin_with_company(&state, "other@example.com").await;
        let controller = DriverController::new(&state);

        let foreign = controller
            .invite(&other_admin, invite("dora@example.com"))
            .await
            .unwrap()
            .data
            .unwrap();
        match controller.remove(&admin, foreign.id).await {
            Err(AppError::NotFound(message)) => assert_eq!(message, "Driver not found or not authorized"),
            other => panic!("unexpected result: {:?}", other.map(|r| r.success)),
        }

        let own = state.repositories.profiles.find_by_user(admin.user_id).await.unwrap().unwrap();
        assert!(matches!(controller.remove(&admin, own.id).await, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_driver_cannot_manage_drivers() {
        let (state, _dir) = test_support::state().await;
        let (admin, _) = test_support::admin_with_company(&state, "boss@example.com").await;
        let controller = DriverController::new(&state);
        controller.invite(&admin, invite("dora@example.com")).await.unwrap();
        let driver = test_support::sign_up(&state, "dora@example.com", "Dora").await;

        assert!(matches!(controller.list(&driver).await, Err(AppError::Forbidden(_))));
        assert!(matches!(
            controller.invite(&driver, invite("eve@example.com")).await,
            Err(AppError::Forbidden(_))
        ));
    }
}
