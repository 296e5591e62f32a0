//! Controladores
//!
//! Cada controlador implementa las acciones de un recurso: autorización,
//! validación y llamadas a los repositorios. Las rutas solo extraen la request.

pub mod attachment_controller;
pub mod auth_controller;
pub mod company_controller;
pub mod driver_controller;
pub mod trip_controller;
pub mod user_controller;
pub mod vehicle_controller;

pub use attachment_controller::AttachmentController;
pub use auth_controller::AuthController;
pub use company_controller::CompanyController;
pub use driver_controller::DriverController;
pub use trip_controller::TripController;
pub use user_controller::UserController;
pub use vehicle_controller::VehicleController;

#[cfg(test)]
pub(crate) mod test_support {
    use tempfile::TempDir;

    use crate::config::EnvironmentConfig;
    use crate::controllers::{AuthController, CompanyController};
    use crate::dto::auth_dto::SignUpRequest;
    use crate::dto::company_dto::CreateCompanyRequest;
    use crate::middleware::AuthenticatedUser;
    use crate::models::Company;
    use crate::repositories::Repositories;
    use crate::services::blob_storage::LocalBlobStore;
    use crate::state::AppState;

    pub async fn state() -> (AppState, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = EnvironmentConfig {
            upload_dir: dir.path().to_path_buf(),
            bcrypt_cost: 4,
            max_upload_bytes: 1024,
            ..Default::default()
        };
        let blobs = LocalBlobStore::open(&config.upload_dir).await.unwrap();
        (AppState::new(Repositories::in_memory(), config, blobs), dir)
    }

    pub async fn sign_up(state: &AppState, email: &str, name: &str) -> AuthenticatedUser {
        let response = AuthController::new(state)
            .sign_up(SignUpRequest {
                email: email.to_string(),
                password: "secret-password".to_string(),
                name: name.to_string(),
            })
            .await
            .unwrap();
        let user = response.data.unwrap().user;
        AuthenticatedUser {
            user_id: user.id,
            email: user.email,
        }
    }

    /// Identidad nueva que crea su empresa y queda como admin
    pub async fn admin_with_company(state: &AppState, email: &str) -> (AuthenticatedUser, Company) {
        let admin = sign_up(state, email, "Admin").await;
        let company = CompanyController::new(state)
            .create(
                &admin,
                CreateCompanyRequest {
                    name: "Muster GmbH".to_string(),
                    address: None,
                    industry: None,
                    is_rental_company: false,
                },
            )
            .await
            .unwrap()
            .data
            .unwrap();
        (admin, company)
    }
}
